use super::{
    BLOCK_MAGIC, ByteOrder, FILE_HEADER_SIZE, FILE_MAGIC, FileHeader, MAGIC_SCAN_WINDOW,
    METADATA_BLOCK_SIZE, Metadata,
};
use crate::error::FlimError;
use crate::format::lookup;

fn field<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], FlimError> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(FlimError::TooShort { len: data.len() })
}

/// Find the `imag` block, scanning backward from its nominal offset.
fn find_block(data: &[u8]) -> Result<usize, FlimError> {
    let nominal = data.len() - METADATA_BLOCK_SIZE;
    let lowest = data.len().saturating_sub(MAGIC_SCAN_WINDOW);
    let offset = (lowest..=nominal)
        .rev()
        .find(|&off| &data[off..off + 4] == BLOCK_MAGIC)
        .ok_or(FlimError::MissingMagic)?;
    if offset != nominal {
        log::debug!(
            "metadata block at 0x{offset:x}, {} bytes before its nominal offset",
            nominal - offset
        );
    }
    Ok(offset)
}

fn parse_file_header(data: &[u8], block: usize) -> Result<Option<(ByteOrder, FileHeader)>, FlimError> {
    let Some(start) = block.checked_sub(FILE_HEADER_SIZE) else {
        return Ok(None);
    };
    if &data[start..start + 4] != FILE_MAGIC {
        return Ok(None);
    }
    let mark: [u8; 2] = field(data, start + 0x04)?;
    let order = ByteOrder::from_mark(mark).ok_or_else(|| {
        FlimError::InvalidHeader(alloc::format!(
            "byte order mark {:02x} {:02x}",
            mark[0],
            mark[1]
        ))
    })?;
    let header = FileHeader {
        header_size: order.read_u16(field(data, start + 0x06)?),
        version: order.read_u32(field(data, start + 0x08)?),
        file_size: order.read_u32(field(data, start + 0x0C)?),
        block_count: order.read_u16(field(data, start + 0x10)?),
    };
    Ok(Some((order, header)))
}

/// Parse a FLIM buffer into its metadata and image payload.
///
/// The payload is `data[..image_data_size]`; it must end before the footer.
/// The input is never modified.
pub fn parse(data: &[u8]) -> Result<(Metadata, &[u8]), FlimError> {
    if data.len() < METADATA_BLOCK_SIZE {
        return Err(FlimError::TooShort { len: data.len() });
    }
    let block = find_block(data)?;

    let (byte_order, file_header) = match parse_file_header(data, block)? {
        Some((order, header)) => (order, Some(header)),
        None => (ByteOrder::Little, None),
    };

    let width = byte_order.read_u16(field(data, block + 0x08)?);
    let height = byte_order.read_u16(field(data, block + 0x0A)?);
    let alignment = byte_order.read_u16(field(data, block + 0x0C)?);
    let [format_id] = field::<1>(data, block + 0x0E)?;
    let [tile_byte] = field::<1>(data, block + 0x0F)?;
    let image_data_size = byte_order.read_u32(field(data, block + 0x10)?);

    if width == 0 || height == 0 {
        return Err(FlimError::InvalidHeader(alloc::format!(
            "zero dimension {width}x{height}"
        )));
    }
    let format = lookup(format_id).ok_or(FlimError::UnsupportedFormat(format_id))?;

    let metadata = Metadata {
        width,
        height,
        alignment,
        format,
        tile_byte,
        image_data_size,
        byte_order,
        file_header,
        block_offset: block,
    };

    let available = metadata.footer_offset();
    let declared = image_data_size as usize;
    if declared > available {
        return Err(FlimError::TruncatedPayload {
            declared,
            available,
        });
    }
    Ok((metadata, &data[..declared]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextureFormat;
    use alloc::vec::Vec;

    fn footer(order: ByteOrder, with_header: bool, payload_len: usize, data_size: u32) -> Vec<u8> {
        let mut out = alloc::vec![0xABu8; payload_len];
        if with_header {
            out.extend_from_slice(FILE_MAGIC);
            out.extend_from_slice(&order.mark());
            out.extend_from_slice(&order.u16_bytes(0x14));
            out.extend_from_slice(&order.u32_bytes(0x0202_0000));
            out.extend_from_slice(&order.u32_bytes(0));
            out.extend_from_slice(&order.u16_bytes(1));
            out.extend_from_slice(&[0, 0]);
        }
        out.extend_from_slice(BLOCK_MAGIC);
        out.extend_from_slice(&order.u32_bytes(0x10));
        out.extend_from_slice(&order.u16_bytes(4));
        out.extend_from_slice(&order.u16_bytes(2));
        out.extend_from_slice(&order.u16_bytes(0x200));
        out.push(0x09);
        out.push(0b010_00001);
        out.extend_from_slice(&order.u32_bytes(data_size));
        out
    }

    #[test]
    fn parses_big_endian_footer() {
        let data = footer(ByteOrder::Big, true, 32, 32);
        let (meta, payload) = parse(&data).unwrap();
        assert_eq!((meta.width, meta.height), (4, 2));
        assert_eq!(meta.alignment, 0x200);
        assert_eq!(meta.format.format, TextureFormat::Rgba8);
        assert_eq!(meta.tile_mode_bits(), 1);
        assert_eq!(meta.swizzle().bank, 1);
        assert_eq!(meta.byte_order, ByteOrder::Big);
        assert_eq!(meta.file_header.unwrap().block_count, 1);
        assert_eq!(payload.len(), 32);
    }

    #[test]
    fn little_endian_mark_is_honoured() {
        let data = footer(ByteOrder::Little, true, 32, 32);
        let (meta, _) = parse(&data).unwrap();
        assert_eq!(meta.byte_order, ByteOrder::Little);
        assert_eq!((meta.width, meta.height), (4, 2));
    }

    #[test]
    fn missing_file_header_reads_little_endian() {
        let data = footer(ByteOrder::Little, false, 32, 32);
        let (meta, payload) = parse(&data).unwrap();
        assert!(meta.file_header.is_none());
        assert_eq!(meta.footer_offset(), 32);
        assert_eq!(payload.len(), 32);
    }

    #[test]
    fn block_found_before_trailing_padding() {
        let mut data = footer(ByteOrder::Big, true, 32, 32);
        data.extend_from_slice(&[0u8; 24]);
        let (meta, _) = parse(&data).unwrap();
        assert_eq!(meta.block_offset, 32 + FILE_HEADER_SIZE);
    }

    #[test]
    fn padding_beyond_window_is_missing_magic() {
        let mut data = footer(ByteOrder::Big, true, 32, 32);
        data.extend_from_slice(&[0u8; MAGIC_SCAN_WINDOW]);
        assert!(matches!(parse(&data), Err(FlimError::MissingMagic)));
    }

    #[test]
    fn too_short() {
        assert!(matches!(
            parse(&[0u8; 19]),
            Err(FlimError::TooShort { len: 19 })
        ));
    }

    #[test]
    fn oversized_payload_is_truncated_error() {
        let data = footer(ByteOrder::Big, true, 32, 33);
        assert!(matches!(
            parse(&data),
            Err(FlimError::TruncatedPayload {
                declared: 33,
                available: 32
            })
        ));
    }

    #[test]
    fn unknown_format_is_reported_with_its_id() {
        let mut data = footer(ByteOrder::Big, true, 32, 32);
        let block = data.len() - METADATA_BLOCK_SIZE;
        data[block + 0x0E] = 0x7F;
        assert!(matches!(parse(&data), Err(FlimError::UnsupportedFormat(0x7F))));
    }

    #[test]
    fn bad_byte_order_mark() {
        let mut data = footer(ByteOrder::Big, true, 32, 32);
        data[32 + 4] = 0x12;
        assert!(matches!(parse(&data), Err(FlimError::InvalidHeader(_))));
    }

    #[test]
    fn zero_width_rejected() {
        let mut data = footer(ByteOrder::Big, true, 32, 32);
        let block = data.len() - METADATA_BLOCK_SIZE;
        data[block + 0x08] = 0;
        data[block + 0x09] = 0;
        assert!(matches!(parse(&data), Err(FlimError::InvalidHeader(_))));
    }
}
