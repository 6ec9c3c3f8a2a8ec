//! Hand-assembled EXIF blocks for tests.
//!
//! Builds a big-endian TIFF structure with an IFD0 (orientation, GPS
//! pointer) and a GPS IFD, and splices it into JPEG bytes as an APP1
//! segment right after SOI.

const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_GPS_POINTER: u16 = 0x8825;
const TAG_GPS_LATITUDE_REF: u16 = 0x0001;
const TAG_GPS_LATITUDE: u16 = 0x0002;
const TAG_GPS_LONGITUDE_REF: u16 = 0x0003;
const TAG_GPS_LONGITUDE: u16 = 0x0004;

struct Entry {
    tag: u16,
    kind: u16,
    count: u32,
    data: Vec<u8>,
}

#[derive(Default)]
pub struct ExifFixture {
    orientation: Option<u16>,
    gps: Vec<Entry>,
}

impl ExifFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orientation(mut self, orientation: u16) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Whole-number latitude with its hemisphere letter.
    pub fn latitude(self, reference: char, dms: [u32; 3]) -> Self {
        self.gps_ascii(TAG_GPS_LATITUDE_REF, &reference.to_string())
            .gps_rationals(TAG_GPS_LATITUDE, &whole(dms))
    }

    /// Whole-number longitude with its hemisphere letter.
    pub fn longitude(self, reference: char, dms: [u32; 3]) -> Self {
        self.gps_ascii(TAG_GPS_LONGITUDE_REF, &reference.to_string())
            .gps_rationals(TAG_GPS_LONGITUDE, &whole(dms))
    }

    pub fn gps_ascii(mut self, tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.gps.push(Entry {
            tag,
            kind: ASCII,
            count: data.len() as u32,
            data,
        });
        self
    }

    pub fn gps_rationals(mut self, tag: u16, values: &[(u32, u32)]) -> Self {
        let mut data = Vec::with_capacity(values.len() * 8);
        for (num, denom) in values {
            data.extend_from_slice(&num.to_be_bytes());
            data.extend_from_slice(&denom.to_be_bytes());
        }
        self.gps.push(Entry {
            tag,
            kind: RATIONAL,
            count: values.len() as u32,
            data,
        });
        self
    }

    /// The raw TIFF structure, starting at the byte-order mark.
    pub fn tiff_bytes(&self) -> Vec<u8> {
        let mut out = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();

        let mut gps: Vec<&Entry> = self.gps.iter().collect();
        gps.sort_by_key(|e| e.tag);

        let mut ifd0 = Vec::new();
        if let Some(orientation) = self.orientation {
            ifd0.push(Entry {
                tag: TAG_ORIENTATION,
                kind: SHORT,
                count: 1,
                data: orientation.to_be_bytes().to_vec(),
            });
        }
        // IFD0 entries are all inline, so the GPS IFD starts right after it.
        let gps_offset = 8 + 2 + (ifd0.len() + 1) * 12 + 4;
        if !gps.is_empty() {
            ifd0.push(Entry {
                tag: TAG_GPS_POINTER,
                kind: LONG,
                count: 1,
                data: (gps_offset as u32).to_be_bytes().to_vec(),
            });
        }

        write_ifd(&mut out, ifd0.iter());
        if !gps.is_empty() {
            debug_assert_eq!(out.len(), gps_offset);
            write_ifd(&mut out, gps.into_iter());
        }
        out
    }

    /// `jpeg` with this EXIF block inserted as its first segment.
    pub fn apply_to_jpeg(&self, jpeg: &[u8]) -> Vec<u8> {
        assert!(jpeg.starts_with(&[0xFF, 0xD8]), "not a JPEG stream");
        let tiff = self.tiff_bytes();

        let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&((tiff.len() + 8) as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\x00\x00");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    /// A metadata-only JPEG stream (SOI, APP1, EOI) with no image data.
    pub fn jpeg(&self) -> Vec<u8> {
        self.apply_to_jpeg(&[0xFF, 0xD8, 0xFF, 0xD9])
    }
}

fn whole(dms: [u32; 3]) -> [(u32, u32); 3] {
    dms.map(|v| (v, 1))
}

fn write_ifd<'a>(out: &mut Vec<u8>, entries: impl ExactSizeIterator<Item = &'a Entry>) {
    let count = entries.len();
    let data_start = out.len() + 2 + count * 12 + 4;
    let mut data_area = Vec::new();

    out.extend_from_slice(&(count as u16).to_be_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_be_bytes());
        out.extend_from_slice(&entry.kind.to_be_bytes());
        out.extend_from_slice(&entry.count.to_be_bytes());
        if entry.data.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..entry.data.len()].copy_from_slice(&entry.data);
            out.extend_from_slice(&inline);
        } else {
            let offset = (data_start + data_area.len()) as u32;
            out.extend_from_slice(&offset.to_be_bytes());
            data_area.extend_from_slice(&entry.data);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&data_area);
}
