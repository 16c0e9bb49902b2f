//! Minimal 32-bit little-endian ELF program-header reader.
//!
//! Only program headers are needed to widen the memory map — section
//! headers, symbol tables, and relocations are never read, since nothing
//! downstream of the memory map looks at them.

use std::fs;
use std::path::Path;

use crate::error::LoadError;
use crate::memory::{MemRegion, MemoryMap};

const EHDR_LEN: usize = 52;
const PHDR_LEN: usize = 32;
const ELFCLASS32: u8 = 1;
const ELFDATA2LSB: u8 = 1;

fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

pub fn load_into(path: &Path, memory: &mut MemoryMap) -> Result<(), LoadError> {
    let data = fs::read(path)?;
    if data.len() < EHDR_LEN {
        return Err(LoadError::Elf("file too short to be an ELF header".to_string()));
    }
    if data[0..4] != [0x7f, b'E', b'L', b'F'] {
        return Err(LoadError::Elf("missing ELF magic".to_string()));
    }
    if data[4] != ELFCLASS32 {
        return Err(LoadError::Elf("only 32-bit ELF images are supported".to_string()));
    }
    if data[5] != ELFDATA2LSB {
        return Err(LoadError::Elf("only little-endian ELF images are supported".to_string()));
    }

    let phoff = read_u32(&data, 28) as usize;
    let phentsize = read_u16(&data, 42) as usize;
    let phnum = read_u16(&data, 44) as usize;

    for i in 0..phnum {
        let hdr_start = phoff + i * phentsize;
        let hdr_end = hdr_start + PHDR_LEN;
        let hdr = data
            .get(hdr_start..hdr_end)
            .ok_or_else(|| LoadError::Elf(format!("program header {i} out of bounds")))?;

        let p_offset = read_u32(hdr, 4) as usize;
        let p_vaddr = read_u32(hdr, 8);
        let p_filesz = read_u32(hdr, 16) as usize;
        let p_memsz = read_u32(hdr, 20) as usize;

        if p_vaddr == 0 {
            continue;
        }

        let mut region = MemRegion::new(p_vaddr, p_memsz as u32, 0);
        let copy_len = p_filesz.min(p_memsz);
        let file_bytes = data
            .get(p_offset..p_offset + copy_len)
            .ok_or_else(|| LoadError::Elf(format!("program header {i} segment out of bounds")))?;
        region.data_mut()[..copy_len].copy_from_slice(file_bytes);
        memory.add_region(region);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path() -> std::path::PathBuf {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!("xtensa_gdbstub_elf_test_{}_{id}", std::process::id()));
        path
    }

    /// Build a minimal one-segment 32-bit LE ELF image.
    fn build_elf(vaddr: u32, segment: &[u8], memsz: u32) -> Vec<u8> {
        let phoff = EHDR_LEN as u32;
        let data_off = phoff + PHDR_LEN as u32;

        let mut buf = vec![0u8; EHDR_LEN];
        buf[0..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        buf[4] = ELFCLASS32;
        buf[5] = ELFDATA2LSB;
        buf[28..32].copy_from_slice(&phoff.to_le_bytes());
        buf[42..44].copy_from_slice(&(PHDR_LEN as u16).to_le_bytes());
        buf[44..46].copy_from_slice(&1u16.to_le_bytes()); // phnum

        let mut phdr = vec![0u8; PHDR_LEN];
        phdr[0..4].copy_from_slice(&1u32.to_le_bytes()); // PT_LOAD
        phdr[4..8].copy_from_slice(&data_off.to_le_bytes());
        phdr[8..12].copy_from_slice(&vaddr.to_le_bytes());
        phdr[16..20].copy_from_slice(&(segment.len() as u32).to_le_bytes());
        phdr[20..24].copy_from_slice(&memsz.to_le_bytes());

        buf.extend_from_slice(&phdr);
        buf.extend_from_slice(segment);
        buf
    }

    #[test]
    fn loads_one_program_header_region() {
        let image = build_elf(0x4010_0000, &[1, 2, 3, 4], 4);
        let path = temp_path();
        fs::write(&path, &image).unwrap();

        let mut memory = MemoryMap::new();
        load_into(&path, &mut memory).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(memory.read_block(0x4010_0000, 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn bss_tail_beyond_filesz_is_zero_filled() {
        let image = build_elf(0x4010_0000, &[0xaa, 0xbb], 8);
        let path = temp_path();
        fs::write(&path, &image).unwrap();

        let mut memory = MemoryMap::new();
        load_into(&path, &mut memory).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(
            memory.read_block(0x4010_0000, 8).unwrap(),
            vec![0xaa, 0xbb, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn rejects_non_elf_file() {
        let path = temp_path();
        fs::write(&path, b"not an elf").unwrap();
        let mut memory = MemoryMap::new();
        let result = load_into(&path, &mut memory);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn zero_vaddr_segment_is_skipped() {
        let image = build_elf(0, &[1, 2, 3, 4], 4);
        let path = temp_path();
        fs::write(&path, &image).unwrap();

        let mut memory = MemoryMap::new();
        load_into(&path, &mut memory).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(memory.read_byte(0), Err(crate::error::MemoryFault { address: 0 }));
    }
}
