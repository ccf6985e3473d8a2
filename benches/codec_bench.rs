//! 编解码基准测试
//! 使用criterion测量地址派生与交易签名数据构建

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ironcore_chains::domain::fee::Fee;
use ironcore_chains::domain::transaction::{KoinosTransactionParams, TransactionParams};
use ironcore_chains::domain::{AddressKind, AddressServiceFactory, Amount, Blockchain, Transaction};
use ironcore_chains::service::transaction_builder::{
    AlgorandBuildContext, AlgorandTransactionBuilder, KoinosNetworkContext,
    KoinosTransactionBuilder, TransactionBuilder,
};

const SECP256K1_KEY: &str = "0241DCD64B5F4A039FC339A16300A833A883B218909F2EBCAF3906651C76842C45";
const ED25519_KEY: &str = "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c";

fn bench_address_derivation(c: &mut Criterion) {
    let secp = hex::decode(SECP256K1_KEY).unwrap();
    let ed = hex::decode(ED25519_KEY).unwrap();

    let mut group = c.benchmark_group("make_address");
    for (name, chain, key) in [
        ("bitcoin", Blockchain::Bitcoin { testnet: false }, &secp),
        ("kaspa", Blockchain::Kaspa { testnet: false }, &secp),
        ("ethereum", Blockchain::Ethereum { testnet: false }, &secp),
        ("filecoin", Blockchain::Filecoin, &secp),
        ("algorand", Blockchain::Algorand { testnet: false }, &ed),
        ("stellar", Blockchain::Stellar { testnet: false }, &ed),
    ] {
        let service = AddressServiceFactory::create(chain).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| service.make_address(black_box(key), AddressKind::Default))
        });
    }
    group.finish();
}

fn bench_address_validation(c: &mut Criterion) {
    let service = AddressServiceFactory::create(Blockchain::Kaspa { testnet: false }).unwrap();
    let address = "kaspa:qypyrhxkfd055qulcvu6zccq4qe63qajrzgf7t4u4uusveguw6zzc3grrceeuex";
    c.bench_function("validate_kaspa_address", |b| {
        b.iter(|| service.validate(black_box(address)))
    });
}

fn bench_build_for_sign(c: &mut Criterion) {
    let algorand_chain = Blockchain::Algorand { testnet: false };
    let algorand = AlgorandTransactionBuilder::new(&hex::decode(ED25519_KEY).unwrap(), false).unwrap();
    let algorand_context = AlgorandBuildContext::new(
        "mainnet-v1.0",
        "wGHE2Pwdvd7S12BL5FaOP20EGYesN73ktiC1qzkkit8=",
        35_626_367,
    )
    .unwrap();
    let algorand_tx = Transaction::new(
        Amount::coin(algorand_chain, "0.5".parse().unwrap()),
        Fee::new(Amount::coin(algorand_chain, "0.001".parse().unwrap())),
        "RKEOHXLUBHYZL7KS3MWTZOS5OLFGOCN7DWKBEG7TOSEADNAPN5OOTUNSLE",
        "QE4XODVIPULV6VVDKRTMGTD6ZTFY3CURWTXDPIS56YHVXD6JWOKORTLPBU",
    );

    let koinos_chain = Blockchain::Koinos { testnet: false };
    let koinos = KoinosTransactionBuilder::new(false);
    let koinos_context = KoinosNetworkContext::for_network(false);
    let koinos_tx = Transaction::new(
        Amount::coin(koinos_chain, "1".parse().unwrap()),
        Fee::new(Amount::coin(koinos_chain, "0.5".parse().unwrap())),
        "1JjXGY5KEcbT35uAo6P9A7DebBn4DXnjdQ",
        "1546ZQTmc2wD32ZEKkS3PEu6Msojxkv3fn",
    )
    .with_params(TransactionParams::Koinos(KoinosTransactionParams { nonce: 11 }));

    let mut group = c.benchmark_group("build_for_sign");
    group.bench_function("algorand", |b| {
        b.iter(|| algorand.build_for_sign(black_box(&algorand_tx), &algorand_context))
    });
    group.bench_function("koinos", |b| {
        b.iter(|| koinos.build_for_sign(black_box(&koinos_tx), &koinos_context))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_address_derivation,
    bench_address_validation,
    bench_build_for_sign
);
criterion_main!(benches);
