//! # 随机数工具函数 (Random Utility Functions)
//! 
//! 本模块提供了密码学安全的随机数生成功能，用于 MPC 协议中的各种随机化操作。
//! 所有函数都使用线程安全的随机数生成器，确保密码学安全性。
//! 
//! ## 主要功能
//! - 生成随机字节序列
//! - 生成随机整数
//! - 生成有限域中的随机元素
//! 
//! 这些函数为密钥生成、随机化协议、噪声添加等提供支持。

use rand::{RngCore, thread_rng};

/// 生成指定长度的随机字节序列
/// 
/// 使用密码学安全的随机数生成器生成指定长度的随机字节。
/// 适用于密钥生成、随机掩码、噪声生成等场景。
/// 
/// # 参数
/// * `len` - 需要生成的字节数量
/// 
/// # 返回值
/// 返回包含随机字节的 Vec<u8>
/// 
/// # 示例
/// ```rust
/// let key = random_bytes(32); // 生成32字节的随机密钥
/// ```
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = thread_rng();
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// 生成随机的64位无符号整数
/// 
/// 使用密码学安全的随机数生成器生成一个随机的 u64 值。
/// 适用于生成随机标识符、随机种子等场景。
/// 
/// # 返回值
/// 返回一个随机的 u64 值
/// 
/// # 示例
/// ```rust
/// let random_id = random_u64();
/// ```
pub fn random_u64() -> u64 {
    let mut rng = thread_rng();
    rng.next_u64()
}

/// 生成随机的 128 位值，用作标签种子等场景
pub fn random_u128() -> u128 {
    let mut rng = thread_rng();
    ((rng.next_u64() as u128) << 64) | rng.next_u64() as u128
}