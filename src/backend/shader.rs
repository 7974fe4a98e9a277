// SPIR-V shader module loading.

use anyhow::{Context, Result};
use ash::vk;
use std::path::Path;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Load a SPIR-V binary from disk and wrap it in a shader module.
pub fn load_shader_module(device: &ash::Device, path: &Path) -> Result<vk::ShaderModule> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read shader file: {}", path.display()))?;

    let words = decode_spirv(&bytes)
        .with_context(|| format!("Invalid SPIR-V in {}", path.display()))?;

    let create_info = vk::ShaderModuleCreateInfo::default().code(&words);

    let module = unsafe {
        device
            .create_shader_module(&create_info, None)
            .context("Failed to create shader module")?
    };

    log::debug!("Loaded shader: {} ({} bytes)", path.display(), bytes.len());

    Ok(module)
}

/// Reinterpret a SPIR-V byte stream as 32-bit words, checking the container
/// invariants the driver assumes.
fn decode_spirv(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.is_empty() || bytes.len() % 4 != 0 {
        anyhow::bail!("SPIR-V length {} is not a nonzero multiple of 4", bytes.len());
    }

    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    if words[0] != SPIRV_MAGIC {
        anyhow::bail!("bad SPIR-V magic number {:#010x}", words[0]);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_words() {
        let bytes = [0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];
        let words = decode_spirv(&bytes).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000]);
    }

    #[test]
    fn rejects_unaligned_length() {
        let bytes = [0x03, 0x02, 0x23];
        assert!(decode_spirv(&bytes).is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(decode_spirv(&[]).is_err());
    }

    #[test]
    fn rejects_wrong_magic() {
        let bytes = [0xde, 0xad, 0xbe, 0xef];
        assert!(decode_spirv(&bytes).is_err());
    }
}
