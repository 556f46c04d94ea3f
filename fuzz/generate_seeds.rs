#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn flim(payload: &[u8], width: u16, height: u16, format: u8, tile: u8) -> Vec<u8> {
    let mut out = payload.to_vec();
    out.extend_from_slice(b"FLIM\xfe\xff");
    out.extend_from_slice(&0x14u16.to_be_bytes());
    out.extend_from_slice(&0x0202_0000u32.to_be_bytes());
    out.extend_from_slice(&((payload.len() + 40) as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(b"imag");
    out.extend_from_slice(&0x10u32.to_be_bytes());
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.extend_from_slice(&0x200u16.to_be_bytes());
    out.push(format);
    out.push(tile);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    let ramp: Vec<u8> = (0..=255u8).collect();

    // RGBA8 4x4, linear general and linear aligned
    fs::write(format!("{dir}/rgba8_4x4_linear.bflim"), flim(&ramp[..64], 4, 4, 0x09, 0x00)).unwrap();
    let mut aligned = vec![0u8; 64 * 4];
    for y in 0..4 {
        aligned[y * 64..y * 64 + 16].copy_from_slice(&ramp[y * 16..y * 16 + 16]);
    }
    fs::write(format!("{dir}/rgba8_4x4_aligned.bflim"), flim(&aligned, 4, 4, 0x09, 0x01)).unwrap();

    // Small uncompressed formats
    fs::write(format!("{dir}/l8_4x4.bflim"), flim(&ramp[..16], 4, 4, 0x00, 0x00)).unwrap();
    fs::write(format!("{dir}/la8_2x2.bflim"), flim(&ramp[..8], 2, 2, 0x03, 0x00)).unwrap();
    fs::write(format!("{dir}/rgb565_2x2.bflim"), flim(&ramp[..8], 2, 2, 0x05, 0x00)).unwrap();
    fs::write(format!("{dir}/l4_3x2.bflim"), flim(&ramp[..4], 3, 2, 0x12, 0x00)).unwrap();

    // Block formats, one 4x4 block each
    fs::write(format!("{dir}/bc1_4x4.bflim"), flim(&ramp[..8], 4, 4, 0x0C, 0x01)).unwrap();
    fs::write(format!("{dir}/bc3_4x4.bflim"), flim(&ramp[..16], 4, 4, 0x0E, 0x01)).unwrap();
    fs::write(format!("{dir}/etc1a4_4x4.bflim"), flim(&ramp[..16], 4, 4, 0x0B, 0x00)).unwrap();

    // Macro tiled with swizzle bits set
    fs::write(format!("{dir}/rgba8_tiled.bflim"), flim(&ramp[..64], 4, 4, 0x09, 0b101_00100)).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_imag.bin"), b"imag").unwrap();
    let mut bad_size = flim(&ramp[..64], 4, 4, 0x09, 0x00);
    let n = bad_size.len();
    bad_size[n - 4..].copy_from_slice(&0xFFFFu32.to_be_bytes());
    fs::write(format!("{dir}/declared_too_big.bflim"), bad_size).unwrap();
    fs::write(format!("{dir}/unknown_tile_mode.bflim"), flim(&ramp[..64], 4, 4, 0x09, 0x1F)).unwrap();

    println!("Generated seed corpus in {dir}/");
}
