//! Byte-level EXIF block builder.
//!
//! Depends on nothing but std so the integration tests can include it with
//! `#[path]` and share one TIFF writer with the unit tests.

// Big-endian TIFF, IFD0 + Exif sub-IFD.

pub const TAG_MAKE: u16 = 0x010F;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_ORIENTATION: u16 = 0x0112;
pub const TAG_IMAGE_WIDTH: u16 = 0x0100;
pub const TAG_IMAGE_LENGTH: u16 = 0x0101;
pub const TAG_EXPOSURE_TIME: u16 = 0x829A;
pub const TAG_F_NUMBER: u16 = 0x829D;
pub const TAG_ISO: u16 = 0x8827;
pub const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const TAG_OFFSET_TIME_ORIGINAL: u16 = 0x9011;
pub const TAG_FOCAL_LENGTH: u16 = 0x920A;
pub const TAG_PIXEL_X_DIMENSION: u16 = 0xA002;
pub const TAG_PIXEL_Y_DIMENSION: u16 = 0xA003;
pub const TAG_LENS_MODEL: u16 = 0xA434;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

#[derive(Debug, Clone)]
pub enum ExifValue {
    Ascii(String),
    Short(u16),
    Long(u32),
    Rational(u32, u32),
}

impl ExifValue {
    pub fn ascii(s: &str) -> Self {
        ExifValue::Ascii(s.to_string())
    }

    /// (type code, count, payload bytes)
    fn encode(&self) -> (u16, u32, Vec<u8>) {
        match self {
            ExifValue::Ascii(s) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                (2, bytes.len() as u32, bytes)
            }
            ExifValue::Short(v) => (3, 1, v.to_be_bytes().to_vec()),
            ExifValue::Long(v) => (4, 1, v.to_be_bytes().to_vec()),
            ExifValue::Rational(n, d) => {
                let mut bytes = n.to_be_bytes().to_vec();
                bytes.extend(d.to_be_bytes());
                (5, 1, bytes)
            }
        }
    }

    fn out_of_line_len(&self) -> usize {
        let n = self.encode().2.len();
        if n <= 4 { 0 } else { n + n % 2 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExifBuilder {
    primary: Vec<(u16, ExifValue)>,
    exif: Vec<(u16, ExifValue)>,
}

impl ExifBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to IFD0 (Make, Model, Orientation, ImageWidth, …).
    pub fn primary(mut self, tag: u16, value: ExifValue) -> Self {
        self.primary.push((tag, value));
        self
    }

    /// Add a field to the Exif sub-IFD (DateTimeOriginal, FNumber, …).
    pub fn exif(mut self, tag: u16, value: ExifValue) -> Self {
        self.exif.push((tag, value));
        self
    }

    pub fn tiff_bytes(&self) -> Vec<u8> {
        let mut out = b"MM\x00\x2A\x00\x00\x00\x08".to_vec();
        let mut primary = self.primary.clone();

        if !self.exif.is_empty() {
            let n0 = primary.len() + 1;
            let data: usize = primary.iter().map(|(_, v)| v.out_of_line_len()).sum();
            let exif_offset = 8 + 2 + 12 * n0 + 4 + data;
            primary.push((TAG_EXIF_IFD_POINTER, ExifValue::Long(exif_offset as u32)));
        }

        primary.sort_by_key(|(tag, _)| *tag);
        write_ifd(&mut out, &primary);

        if !self.exif.is_empty() {
            let mut exif = self.exif.clone();
            exif.sort_by_key(|(tag, _)| *tag);
            write_ifd(&mut out, &exif);
        }
        out
    }

    /// Complete APP1 segment: marker, length, `Exif\0\0`, TIFF block.
    pub fn app1_segment(&self) -> Vec<u8> {
        let mut payload = b"Exif\x00\x00".to_vec();
        payload.extend(self.tiff_bytes());
        let mut segment = vec![0xFF, 0xE1];
        segment.extend(((payload.len() + 2) as u16).to_be_bytes());
        segment.extend(payload);
        segment
    }
}

fn write_ifd(out: &mut Vec<u8>, entries: &[(u16, ExifValue)]) {
    let data_start = out.len() + 2 + 12 * entries.len() + 4;
    let mut data = Vec::new();

    out.extend((entries.len() as u16).to_be_bytes());
    for (tag, value) in entries {
        let (ty, count, mut bytes) = value.encode();
        out.extend(tag.to_be_bytes());
        out.extend(ty.to_be_bytes());
        out.extend(count.to_be_bytes());
        if bytes.len() <= 4 {
            bytes.resize(4, 0);
            out.extend(bytes);
        } else {
            out.extend(((data_start + data.len()) as u32).to_be_bytes());
            data.extend(&bytes);
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }
    }
    out.extend(0u32.to_be_bytes());
    out.extend(data);
}

#[test]
fn exif_builder_offsets_point_inside_block() {
    let tiff = ExifBuilder::new()
        .primary(TAG_MAKE, ExifValue::ascii("Canon"))
        .exif(TAG_LENS_MODEL, ExifValue::ascii("RF 24-70mm"))
        .tiff_bytes();
    // IFD0: 2 entries (Make + pointer) → 2 + 24 + 4 bytes, then "Canon\0"
    let exif_offset = 8 + 30 + 6;
    assert_eq!(&tiff[exif_offset..exif_offset + 2], &[0, 1]);
    assert!(tiff.len() > exif_offset + 18);
}
