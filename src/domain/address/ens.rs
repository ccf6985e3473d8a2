//! ENS 域名
//!
//! - `namehash`：从根节点（32 字节 0）开始，自右向左对每个标签做
//!   `node = keccak256(node || keccak256(label))`
//! - `encode`：DNS wire 格式，每个标签带 1 字节长度前缀，末尾 0 表示根

use sha3::{Digest, Keccak256};

use crate::error::{CoreError, CoreResult};

/// 标签最大字节数
pub const MAX_LABEL_LENGTH: usize = 63;

/// 严格校验：只允许小写字母、数字和连字符，标签不能以连字符开头或结尾，顶级域至少 2 个字符
pub fn is_valid_name(name: &str) -> bool {
    let labels: Vec<&str> = name.split('.').collect();
    let Some(tld) = labels.last() else {
        return false;
    };
    if tld.len() < 2 {
        return false;
    }
    labels.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    (1..=MAX_LABEL_LENGTH).contains(&label.len())
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !label.starts_with('-')
        && !label.ends_with('-')
}

/// ENS namehash
pub fn namehash(name: &str) -> CoreResult<[u8; 32]> {
    if !is_valid_name(name) {
        return Err(CoreError::InvalidName(name.to_string()));
    }

    let mut node = [0u8; 32];
    for label in name.rsplit('.') {
        let label_hash = Keccak256::digest(label.as_bytes());
        let mut hasher = Keccak256::new();
        hasher.update(node);
        hasher.update(label_hash);
        node.copy_from_slice(&hasher.finalize());
    }
    Ok(node)
}

/// DNS wire 编码
pub fn encode(name: &str) -> CoreResult<Vec<u8>> {
    let labels: Vec<&str> = name.split('.').collect();

    // 长度错误优先于字符集错误
    if let Some(label) = labels
        .iter()
        .find(|label| label.is_empty() || label.len() > MAX_LABEL_LENGTH)
    {
        return Err(CoreError::InvalidLabelLength {
            label: label.to_string(),
            length: label.len(),
        });
    }
    if !is_valid_name(name) {
        return Err(CoreError::InvalidName(name.to_string()));
    }

    let mut out = Vec::with_capacity(name.len() + 2);
    for label in labels {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    Ok(out)
}
