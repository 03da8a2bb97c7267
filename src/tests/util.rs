use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::output::FrameShape;

/// One decoded binary path frame.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DecodedFrame {
    pub nbins: u32,
    pub negbins: u32,
    pub maxedout: u32,
    pub extinction: i32,
    pub inf: Vec<u32>,
    pub newinf: Vec<u32>,
    pub newpostest: Vec<u32>,
}

/// Decode a whole output file of frames of the given shape.
pub fn decode_frames(bytes: &[u8], shape: FrameShape) -> Vec<DecodedFrame> {
    let mut cur = Cursor::new(bytes);
    let mut frames = Vec::new();

    while (cur.position() as usize) < bytes.len() {
        let nbins = cur.read_u32::<LittleEndian>().unwrap();
        let negbins = if shape.relative() {
            cur.read_u32::<LittleEndian>().unwrap()
        } else {
            0
        };
        let maxedout = cur.read_u32::<LittleEndian>().unwrap();
        let extinction = cur.read_i32::<LittleEndian>().unwrap();

        let mut read_bins = || {
            (0..nbins)
                .map(|_| cur.read_u32::<LittleEndian>().unwrap())
                .collect::<Vec<_>>()
        };
        let inf = read_bins();
        let newinf = read_bins();
        let newpostest = if shape.postest() { read_bins() } else { Vec::new() };

        frames.push(DecodedFrame {
            nbins,
            negbins,
            maxedout,
            extinction,
            inf,
            newinf,
            newpostest,
        });
    }
    frames
}

/// Decode a contact-tracing file into (postesttime, presymtime, id, pid,
/// ntracedcts) records.
pub fn decode_ct(bytes: &[u8]) -> Vec<[u32; 5]> {
    assert_eq!(bytes.len() % 20, 0, "tracing records are 20 bytes");
    let mut cur = Cursor::new(bytes);

    (0..bytes.len() / 20)
        .map(|_| {
            [
                cur.read_u32::<LittleEndian>().unwrap(),
                cur.read_u32::<LittleEndian>().unwrap(),
                cur.read_u32::<LittleEndian>().unwrap(),
                cur.read_u32::<LittleEndian>().unwrap(),
                cur.read_u32::<LittleEndian>().unwrap(),
            ]
        })
        .collect()
}
