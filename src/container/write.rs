use alloc::vec::Vec;

use super::{BLOCK_MAGIC, ByteOrder, FILE_HEADER_SIZE, FILE_MAGIC, FILE_VERSION, METADATA_BLOCK_SIZE};

/// Values written into a fresh footer.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FooterFields {
    pub width: u16,
    pub height: u16,
    pub alignment: u16,
    pub format_id: u8,
    pub tile_byte: u8,
    pub byte_order: ByteOrder,
}

/// Append a `FLIM` header and `imag` block to `payload`.
pub(crate) fn write_container(payload: &[u8], fields: &FooterFields) -> Vec<u8> {
    let order = fields.byte_order;
    let total = payload.len() + FILE_HEADER_SIZE + METADATA_BLOCK_SIZE;
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(payload);

    out.extend_from_slice(FILE_MAGIC);
    out.extend_from_slice(&order.mark());
    out.extend_from_slice(&order.u16_bytes(FILE_HEADER_SIZE as u16));
    out.extend_from_slice(&order.u32_bytes(FILE_VERSION));
    out.extend_from_slice(&order.u32_bytes(total as u32));
    out.extend_from_slice(&order.u16_bytes(1));
    out.extend_from_slice(&[0, 0]);

    out.extend_from_slice(BLOCK_MAGIC);
    out.extend_from_slice(&order.u32_bytes(0x10));
    out.extend_from_slice(&order.u16_bytes(fields.width));
    out.extend_from_slice(&order.u16_bytes(fields.height));
    out.extend_from_slice(&order.u16_bytes(fields.alignment));
    out.push(fields.format_id);
    out.push(fields.tile_byte);
    out.extend_from_slice(&order.u32_bytes(payload.len() as u32));

    log::debug!(
        "wrote {}x{} format 0x{:02x} container, {} byte payload",
        fields.width,
        fields.height,
        fields.format_id,
        payload.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::parse;

    #[test]
    fn written_footer_parses_back() {
        for order in [ByteOrder::Big, ByteOrder::Little] {
            let fields = FooterFields {
                width: 3,
                height: 5,
                alignment: 0x200,
                format_id: 0x0C,
                tile_byte: 0b011_00001,
                byte_order: order,
            };
            let payload = [7u8; 40];
            let data = write_container(&payload, &fields);
            let (meta, body) = parse(&data).unwrap();
            assert_eq!((meta.width, meta.height), (3, 5));
            assert_eq!(meta.tile_byte, fields.tile_byte);
            assert_eq!(meta.byte_order, order);
            assert_eq!(meta.file_header.unwrap().file_size as usize, data.len());
            assert_eq!(body, payload);
        }
    }
}
