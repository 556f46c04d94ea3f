#![no_main]
use libfuzzer_sys::fuzz_target;
use zenflim::*;

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the footer claims.
    let _ = probe(data);
    let _ = decode(data, enough::Unstoppable);
    let _ = DecodeRequest::new(data)
        .with_fallback(Fallback::Placeholder)
        .with_alpha_convention(AlphaConvention::Composite)
        .decode(enough::Unstoppable);
    let _ = DecodeRequest::new(data).decode_rg8(enough::Unstoppable);

    // Decoded output always matches the declared dimensions.
    if let Ok(decoded) = decode(data, enough::Unstoppable) {
        assert_eq!(
            decoded.pixels().len(),
            decoded.width as usize * decoded.height as usize * 4
        );
    }
});
