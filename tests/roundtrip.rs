use enough::Unstoppable;
use zenflim::*;

fn gradient(w: usize, h: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let off = (y * w + x) * 4;
            pixels[off] = (x * 255 / w.max(1)) as u8;
            pixels[off + 1] = (y * 255 / h.max(1)) as u8;
            pixels[off + 2] = ((x + y) * 17) as u8;
            pixels[off + 3] = 255 - (x * 3) as u8;
        }
    }
    pixels
}

#[test]
fn rgba8_linear_aligned_roundtrip() {
    let (w, h) = (10, 6);
    let pixels = gradient(w, h);

    let encoded = EncodeRequest::new(TextureFormat::Rgba8)
        .with_tile_mode(TileMode::LinearAligned)
        .encode(&pixels, w as u32, h as u32, Unstoppable)
        .unwrap();

    // 10 px at 32 bpp pad to a 16 px pitch.
    let info = probe(&encoded).unwrap();
    assert_eq!(info.image_data_size as usize, 16 * 4 * h);
    assert_eq!(info.tile_mode, 1);
    assert_eq!(info.byte_order, ByteOrder::Big);

    let decoded = DecodeRequest::new(&encoded).decode(Unstoppable).unwrap();
    assert_eq!((decoded.width, decoded.height), (w as u32, h as u32));
    assert_eq!(decoded.layout, PixelLayout::Rgba8);
    assert_eq!(decoded.pixels(), &pixels[..]);
    assert!(!decoded.is_borrowed());
}

#[test]
fn rgba8_linear_general_is_zero_copy() {
    let (w, h) = (5, 3);
    let pixels = gradient(w, h);

    let encoded = EncodeRequest::new(TextureFormat::Rgba8Srgb)
        .with_tile_mode(TileMode::LinearGeneral)
        .encode(&pixels, w as u32, h as u32, Unstoppable)
        .unwrap();

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
    assert!(decoded.is_borrowed(), "linear RGBA8 decode should be zero-copy");
    assert_eq!(decoded.into_owned().pixels(), &pixels[..]);
}

#[test]
fn little_endian_container_roundtrip() {
    let pixels = gradient(4, 4);
    let encoded = EncodeRequest::new(TextureFormat::Rgba8)
        .with_byte_order(ByteOrder::Little)
        .with_alignment(0x1000)
        .encode(&pixels, 4, 4, Unstoppable)
        .unwrap();

    let info = ImageInfo::from_bytes(&encoded).unwrap();
    assert_eq!(info.byte_order, ByteOrder::Little);
    assert_eq!(info.alignment, 0x1000);
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn swizzle_bits_survive_the_footer() {
    let swizzle = BankPipeSwizzle { pipe: 1, bank: 2 };
    let encoded = EncodeRequest::new(TextureFormat::Rgba8)
        .with_swizzle(swizzle)
        .encode(&gradient(2, 2), 2, 2, Unstoppable)
        .unwrap();
    let info = probe(&encoded).unwrap();
    assert_eq!(info.swizzle, swizzle);
    assert_eq!(info.tile_mode, 1);
}

#[test]
fn encode_rejects_unimplemented_format() {
    let err = EncodeRequest::new(TextureFormat::Rgb565)
        .encode(&gradient(4, 4), 4, 4, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, FlimError::EncodingNotImplemented(0x05)));
}

#[test]
fn encode_rejects_oversized_dimensions() {
    let err = EncodeRequest::new(TextureFormat::Rgba8)
        .encode(&[], 70_000, 1, Unstoppable)
        .unwrap_err();
    assert!(matches!(err, FlimError::DimensionsTooLarge { width: 70_000, .. }));
}

// ── In-place replacement ────────────────────────────────────────────

#[test]
fn replace_pixels_overwrites_payload_only() {
    let (w, h) = (6, 4);
    let original = EncodeRequest::new(TextureFormat::Rgba8)
        .encode(&gradient(w, h), w as u32, h as u32, Unstoppable)
        .unwrap();
    let footer_start = original.len() - 40;

    let mut texture = Texture::from_bytes(original.clone()).unwrap();
    let replacement: Vec<u8> = gradient(w, h).iter().map(|b| b ^ 0x5A).collect();
    texture
        .replace_pixels(&replacement, &EncodeOptions::default(), Unstoppable)
        .unwrap();

    assert_eq!(texture.as_bytes().len(), original.len());
    assert_eq!(&texture.as_bytes()[footer_start..], &original[footer_start..]);
    let decoded = texture.decode(&DecodeOptions::default(), Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &replacement[..]);

    let reparsed = DecodeRequest::new(&texture.as_bytes()[..])
        .decode(Unstoppable)
        .unwrap();
    assert_eq!(reparsed.pixels(), &replacement[..]);
}

#[test]
fn replace_pixels_rejects_linear_general() {
    let encoded = EncodeRequest::new(TextureFormat::Rgba8)
        .with_tile_mode(TileMode::LinearGeneral)
        .encode(&gradient(4, 4), 4, 4, Unstoppable)
        .unwrap();
    let mut texture = Texture::from_bytes(encoded.clone()).unwrap();
    let err = texture
        .replace_pixels(&gradient(4, 4), &EncodeOptions::default(), Unstoppable)
        .unwrap_err();
    assert!(matches!(err, FlimError::NotTiled(0)));
    assert_eq!(texture.into_bytes(), encoded);
}

#[test]
fn replace_pixels_short_rgba_is_buffer_too_small() {
    let encoded = EncodeRequest::new(TextureFormat::Rgba8)
        .encode(&gradient(4, 4), 4, 4, Unstoppable)
        .unwrap();
    let mut texture = Texture::from_bytes(encoded).unwrap();
    let err = texture
        .replace_pixels(&[0u8; 10], &EncodeOptions::default(), Unstoppable)
        .unwrap_err();
    assert!(matches!(err, FlimError::BufferTooSmall { needed: 64, actual: 10 }));
}

// ── Block compression ───────────────────────────────────────────────

#[cfg(feature = "bcn")]
fn solid(w: usize, h: usize, px: [u8; 4]) -> Vec<u8> {
    px.repeat(w * h)
}

#[cfg(feature = "bcn")]
fn assert_close(actual: &[u8], expected: &[u8], tolerance: u8) {
    assert_eq!(actual.len(), expected.len());
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(a.abs_diff(e) <= tolerance, "byte {i}: {a} vs {e}");
    }
}

#[cfg(feature = "bcn")]
#[test]
fn bc1_solid_roundtrip() {
    let pixels = solid(8, 8, [255, 0, 0, 255]);
    let encoded = EncodeRequest::new(TextureFormat::Bc1)
        .encode(&pixels, 8, 8, Unstoppable)
        .unwrap();
    let info = probe(&encoded).unwrap();
    assert_eq!(info.format, TextureFormat::Bc1);

    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_close(decoded.pixels(), &pixels, 8);
}

#[cfg(feature = "bcn")]
#[test]
fn bc3_odd_size_roundtrip() {
    let pixels = solid(6, 5, [0, 0, 255, 255]);
    let encoded = EncodeRequest::new(TextureFormat::Bc3Srgb)
        .encode(&pixels, 6, 5, Unstoppable)
        .unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!((decoded.width, decoded.height), (6, 5));
    assert_close(decoded.pixels(), &pixels, 8);
}

#[cfg(feature = "bcn")]
#[test]
fn bc1_replace_in_place() {
    let encoded = EncodeRequest::new(TextureFormat::Bc1)
        .encode(&solid(8, 8, [0, 0, 0, 255]), 8, 8, Unstoppable)
        .unwrap();
    let mut texture = Texture::from_bytes(encoded).unwrap();
    let white = solid(8, 8, [255, 255, 255, 255]);
    texture
        .replace_pixels(&white, &EncodeOptions::default(), Unstoppable)
        .unwrap();
    let decoded = texture.decode(&DecodeOptions::default(), Unstoppable).unwrap();
    assert_close(decoded.pixels(), &white, 8);
}
