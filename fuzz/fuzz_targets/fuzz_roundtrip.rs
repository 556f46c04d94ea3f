#![no_main]
use libfuzzer_sys::fuzz_target;
use zenflim::*;

fuzz_target!(|data: &[u8]| {
    let Ok(mut texture) = Texture::from_bytes(data.to_vec()) else {
        return;
    };
    let lossless = matches!(
        texture.metadata().format.format,
        TextureFormat::Rgba8 | TextureFormat::Rgba8Srgb
    );
    let Ok(decoded) = texture.decode(&DecodeOptions::default(), enough::Unstoppable) else {
        return;
    };
    let pixels = decoded.into_pixels();
    let footer = texture.metadata().footer_offset();
    let original = data.to_vec();

    // Replacing with the decoded pixels must leave the footer intact and,
    // for RGBA8, decode back to the same pixels.
    if texture
        .replace_pixels(&pixels, &EncodeOptions::default(), enough::Unstoppable)
        .is_err()
    {
        assert_eq!(texture.as_bytes(), &original[..], "failed replace mutated buffer");
        return;
    }
    assert_eq!(&texture.as_bytes()[footer..], &original[footer..]);
    if lossless {
        let again = texture
            .decode(&DecodeOptions::default(), enough::Unstoppable)
            .expect("re-decode after replace");
        assert_eq!(again.pixels(), &pixels[..], "RGBA8 replace roundtrip mismatch");
    }
});
