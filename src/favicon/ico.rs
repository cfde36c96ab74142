//! # ICO 容器编码模块
//!
//! ## 设计思路
//!
//! 按传统多尺寸图标容器格式逐字节写出 `favicon.ico`。
//! 所有字段通过 `BinaryWriter` 写入：写指针显式前进，越界写入直接报错，
//! 而不是在裸缓冲上手算偏移。
//!
//! ## 字段布局（小端）
//!
//! ```text
//! 文件头      6 字节   reserved=0 u16 | type=1 u16 | count u16
//! 目录项 ×N  16 字节   width u8 | height u8 | palette=0 u8 | reserved=0 u8
//!                      planes=1 u16 | bpp=32 u16 | size u32 | offset u32
//! 数据块 ×N            BITMAPINFOHEADER(40) + 像素（自下而上，BGRA）
//! ```
//!
//! 边长 256 在目录中记为 0。BITMAPINFOHEADER 的高度字段为 `2 × edge`，
//! 但不写 AND 掩码，只写 32 位 BGRA 像素。

use super::source::RasterFrame;
use super::FaviconError;

/// 文件头长度。
pub const HEADER_LEN: usize = 6;
/// 单个目录项长度。
pub const DIR_ENTRY_LEN: usize = 16;
/// BITMAPINFOHEADER 长度。
pub const BITMAP_INFO_HEADER_LEN: usize = 40;
/// 容器类型：1 = 图标，2 = 光标。
pub const ICON_TYPE: u16 = 1;
/// 允许写入容器的最大边长。
pub const MAX_ICON_EDGE: u32 = 256;

const BITS_PER_PIXEL: u16 = 32;
const COLOR_PLANES: u16 = 1;

/// 容器中的一个目录项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconContainerEntry {
    pub width: u8,
    pub height: u8,
    pub palette: u8,
    pub reserved: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub size: u32,
    pub offset: u32,
}

impl IconContainerEntry {
    /// 目录中的实际边长（0 表示 256）。
    pub fn edge(&self) -> u32 {
        if self.width == 0 { 256 } else { self.width as u32 }
    }
}

/// 带写指针的定长小端写入器。
///
/// 缓冲长度在创建时确定，任何超出末尾的写入都会返回错误。
pub struct BinaryWriter {
    buf: Vec<u8>,
    cursor: usize,
}

impl BinaryWriter {
    pub fn with_len(len: usize) -> Self {
        Self {
            buf: vec![0; len],
            cursor: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.cursor
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), FaviconError> {
        let end = self
            .cursor
            .checked_add(bytes.len())
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                FaviconError::Generation(format!(
                    "ICO 写入越界：位置 {} 写入 {} 字节（缓冲 {} 字节）",
                    self.cursor,
                    bytes.len(),
                    self.buf.len()
                ))
            })?;

        self.buf[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), FaviconError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), FaviconError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), FaviconError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), FaviconError> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// 取出缓冲；写指针必须恰好停在末尾。
    pub fn finish(self) -> Result<Vec<u8>, FaviconError> {
        if self.cursor != self.buf.len() {
            return Err(FaviconError::Generation(format!(
                "ICO 写入不完整：已写 {} / {} 字节",
                self.cursor,
                self.buf.len()
            )));
        }
        Ok(self.buf)
    }
}

/// 单帧数据块长度：`40 + edge² × 4`。
pub fn image_data_len(edge: u32) -> usize {
    BITMAP_INFO_HEADER_LEN + RasterFrame::expected_len(edge)
}

fn dimension_byte(edge: u32) -> u8 {
    if edge == MAX_ICON_EDGE { 0 } else { edge as u8 }
}

/// 将帧序列编码为 ICO 容器。
///
/// # Panics
///
/// 帧边长不在 `1..=256`、帧数超过 `u16::MAX` 或缓冲长度与边长不符时立即 panic：
/// 这些情况只会来自调用方违约。
pub fn encode_container(frames: &[RasterFrame]) -> Vec<u8> {
    assert!(frames.len() <= u16::MAX as usize, "ICO 帧数超出 u16 范围");
    for frame in frames {
        assert!(
            (1..=MAX_ICON_EDGE).contains(&frame.edge()),
            "ICO 帧边长超出范围：{}",
            frame.edge()
        );
        assert_eq!(
            frame.pixels().len(),
            RasterFrame::expected_len(frame.edge()),
            "ICO 帧缓冲长度与边长不符"
        );
    }

    let entries = build_directory(frames);
    let total_len = HEADER_LEN
        + DIR_ENTRY_LEN * frames.len()
        + frames.iter().map(|f| image_data_len(f.edge())).sum::<usize>();

    // 长度已预先算好，写入失败只可能是本函数自身的逻辑错误
    match write_container(frames, &entries, total_len) {
        Ok(bytes) => bytes,
        Err(err) => panic!("ICO 布局计算错误：{}", err),
    }
}

fn build_directory(frames: &[RasterFrame]) -> Vec<IconContainerEntry> {
    let mut offset = (HEADER_LEN + DIR_ENTRY_LEN * frames.len()) as u32;
    frames
        .iter()
        .map(|frame| {
            let size = image_data_len(frame.edge()) as u32;
            let entry = IconContainerEntry {
                width: dimension_byte(frame.edge()),
                height: dimension_byte(frame.edge()),
                palette: 0,
                reserved: 0,
                planes: COLOR_PLANES,
                bit_count: BITS_PER_PIXEL,
                size,
                offset,
            };
            offset += size;
            entry
        })
        .collect()
}

fn write_container(
    frames: &[RasterFrame],
    entries: &[IconContainerEntry],
    total_len: usize,
) -> Result<Vec<u8>, FaviconError> {
    let mut writer = BinaryWriter::with_len(total_len);

    writer.write_u16(0)?;
    writer.write_u16(ICON_TYPE)?;
    writer.write_u16(frames.len() as u16)?;

    for entry in entries {
        writer.write_u8(entry.width)?;
        writer.write_u8(entry.height)?;
        writer.write_u8(entry.palette)?;
        writer.write_u8(entry.reserved)?;
        writer.write_u16(entry.planes)?;
        writer.write_u16(entry.bit_count)?;
        writer.write_u32(entry.size)?;
        writer.write_u32(entry.offset)?;
    }

    for (frame, entry) in frames.iter().zip(entries) {
        debug_assert_eq!(writer.position(), entry.offset as usize);
        write_bitmap_block(&mut writer, frame)?;
    }

    writer.finish()
}

fn write_bitmap_block(writer: &mut BinaryWriter, frame: &RasterFrame) -> Result<(), FaviconError> {
    let edge = frame.edge();

    writer.write_u32(BITMAP_INFO_HEADER_LEN as u32)?;
    writer.write_i32(edge as i32)?;
    writer.write_i32(edge as i32 * 2)?;
    writer.write_u16(COLOR_PLANES)?;
    writer.write_u16(BITS_PER_PIXEL)?;
    writer.write_u32(0)?; // BI_RGB
    writer.write_u32(RasterFrame::expected_len(edge) as u32)?;
    writer.write_i32(0)?;
    writer.write_i32(0)?;
    writer.write_u32(0)?;
    writer.write_u32(0)?;

    let row_len = edge as usize * 4;
    for row in frame.pixels().chunks_exact(row_len).rev() {
        for px in row.chunks_exact(4) {
            writer.write_bytes(&[px[2], px[1], px[0], px[3]])?;
        }
    }

    Ok(())
}

/// 读取 ICO 文件头与目录，并校验每个数据块都落在文件内。
pub fn read_directory(bytes: &[u8]) -> Result<Vec<IconContainerEntry>, FaviconError> {
    if bytes.len() < HEADER_LEN {
        return Err(FaviconError::Decode("ICO 文件头不完整".to_string()));
    }

    let u16_at = |pos: usize| u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);
    let u32_at =
        |pos: usize| u32::from_le_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]);

    if u16_at(0) != 0 {
        return Err(FaviconError::Decode("ICO 保留字段非 0".to_string()));
    }
    if u16_at(2) != ICON_TYPE {
        return Err(FaviconError::Decode(format!("不是图标容器：type={}", u16_at(2))));
    }

    let count = u16_at(4) as usize;
    let dir_end = HEADER_LEN + DIR_ENTRY_LEN * count;
    if bytes.len() < dir_end {
        return Err(FaviconError::Decode(format!("ICO 目录不完整：声明 {} 项", count)));
    }

    (0..count)
        .map(|i| {
            let base = HEADER_LEN + DIR_ENTRY_LEN * i;
            let entry = IconContainerEntry {
                width: bytes[base],
                height: bytes[base + 1],
                palette: bytes[base + 2],
                reserved: bytes[base + 3],
                planes: u16_at(base + 4),
                bit_count: u16_at(base + 6),
                size: u32_at(base + 8),
                offset: u32_at(base + 12),
            };

            let end = entry.offset as usize + entry.size as usize;
            if (entry.offset as usize) < dir_end || end > bytes.len() {
                return Err(FaviconError::Decode(format!(
                    "ICO 第 {} 项数据块越界：offset={} size={}",
                    i, entry.offset, entry.size
                )));
            }
            Ok(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(edge: u32, rgba: [u8; 4]) -> RasterFrame {
        let pixels = rgba.repeat((edge * edge) as usize);
        RasterFrame::new(edge, pixels).expect("valid frame")
    }

    #[test]
    fn writer_rejects_overflowing_write() {
        let mut writer = BinaryWriter::with_len(3);
        writer.write_u16(7).expect("fits");

        assert!(matches!(writer.write_u16(8), Err(FaviconError::Generation(_))));
        assert_eq!(writer.position(), 2);
        assert_eq!(writer.remaining(), 1);
    }

    #[test]
    fn writer_finish_requires_full_buffer() {
        let mut writer = BinaryWriter::with_len(4);
        writer.write_u16(1).expect("fits");

        assert!(writer.finish().is_err());
    }

    #[test]
    fn header_and_directory_follow_layout() {
        let frames = [16, 32, 48].map(|edge| solid_frame(edge, [1, 2, 3, 4]));
        let ico = encode_container(&frames);

        assert_eq!(&ico[0..6], &[0, 0, 1, 0, 3, 0]);

        let entries = read_directory(&ico).expect("directory");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].offset as usize, HEADER_LEN + DIR_ENTRY_LEN * 3);
        for (entry, edge) in entries.iter().zip([16u32, 32, 48]) {
            assert_eq!(entry.width as u32, edge);
            assert_eq!(entry.height as u32, edge);
            assert_eq!(entry.planes, 1);
            assert_eq!(entry.bit_count, 32);
            assert_eq!(entry.size as usize, 40 + (edge * edge * 4) as usize);
        }
        for pair in entries.windows(2) {
            assert_eq!(pair[1].offset, pair[0].offset + pair[0].size);
        }
        let last = entries[2];
        assert_eq!(ico.len(), (last.offset + last.size) as usize);
    }

    #[test]
    fn edge_256_is_stored_as_zero() {
        let ico = encode_container(&[solid_frame(256, [0, 0, 0, 255])]);
        let entries = read_directory(&ico).expect("directory");

        assert_eq!(entries[0].width, 0);
        assert_eq!(entries[0].height, 0);
        assert_eq!(entries[0].edge(), 256);
    }

    #[test]
    fn bitmap_header_uses_doubled_height() {
        let ico = encode_container(&[solid_frame(16, [0, 0, 0, 255])]);
        let block = HEADER_LEN + DIR_ENTRY_LEN;
        let i32_at = |p: usize| i32::from_le_bytes(ico[p..p + 4].try_into().unwrap());
        let u32_at = |p: usize| u32::from_le_bytes(ico[p..p + 4].try_into().unwrap());

        assert_eq!(u32_at(block), 40);
        assert_eq!(i32_at(block + 4), 16);
        assert_eq!(i32_at(block + 8), 32);
        assert_eq!(u32_at(block + 16), 0);
        assert_eq!(u32_at(block + 20), 16 * 16 * 4);
        assert!(ico[block + 24..block + 40].iter().all(|b| *b == 0));
    }

    #[test]
    fn pixels_are_bottom_up_bgra() {
        // 2x2：第一行红/绿，第二行蓝/白半透明
        let pixels = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 128,
        ];
        let frame = RasterFrame::new(2, pixels).expect("valid frame");
        let ico = encode_container(&[frame]);
        let data = &ico[HEADER_LEN + DIR_ENTRY_LEN + BITMAP_INFO_HEADER_LEN..];

        assert_eq!(
            data,
            &[
                255, 0, 0, 255, 255, 255, 255, 128, //
                0, 0, 255, 255, 0, 255, 0, 255,
            ]
        );
    }

    #[test]
    #[should_panic]
    fn oversized_frame_is_a_contract_violation() {
        encode_container(&[solid_frame(512, [0, 0, 0, 0])]);
    }

    #[test]
    fn read_directory_rejects_cursor_type() {
        let mut ico = encode_container(&[solid_frame(16, [0, 0, 0, 0])]);
        ico[2] = 2;

        assert!(matches!(read_directory(&ico), Err(FaviconError::Decode(_))));
    }

    #[test]
    fn read_directory_rejects_truncated_payload() {
        let ico = encode_container(&[solid_frame(16, [0, 0, 0, 0])]);

        assert!(read_directory(&ico[..ico.len() - 1]).is_err());
    }
}
