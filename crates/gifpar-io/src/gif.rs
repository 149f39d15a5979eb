//! Animated GIF codec.
//!
//! Decoding composites every frame onto the full logical screen, so each
//! [`Frame`] has the canvas geometry regardless of how the file stored it.
//! Palettes, disposal and transparency stay inside the `image` crate; the
//! rest of gifpar only ever sees RGB.
//!
//! Encoding writes one full-canvas frame per input frame, loops forever and
//! keeps per-frame delays.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use gifpar_core::{Frame, FrameSequence, Rgb};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::{AnimationDecoder, Delay, ImageError, RgbaImage};
use tracing::{debug, trace};

use crate::{IoError, IoResult};

fn decode_error(e: ImageError) -> IoError {
    match e {
        ImageError::Unsupported(u) => IoError::UnsupportedInput(u.to_string()),
        ImageError::IoError(io) => IoError::Io(io),
        other => IoError::Decode(other.to_string()),
    }
}

fn encode_error(e: ImageError) -> IoError {
    match e {
        ImageError::IoError(io) => IoError::Io(io),
        other => IoError::Encode(other.to_string()),
    }
}

/// Loads every frame of an animated GIF.
///
/// A file without frames is rejected as unsupported input; nothing is
/// returned partially.
pub fn load<P: AsRef<Path>>(path: P) -> IoResult<FrameSequence> {
    let path = path.as_ref();
    trace!(path = %path.display(), "gif::load");

    let reader = BufReader::new(File::open(path)?);
    let decoder = GifDecoder::new(reader).map_err(decode_error)?;
    let decoded = decoder.into_frames().collect_frames().map_err(decode_error)?;
    if decoded.is_empty() {
        return Err(IoError::UnsupportedInput(format!("{} contains no frames", path.display())));
    }

    let mut frames = Vec::with_capacity(decoded.len());
    for frame in &decoded {
        let (numer, denom) = frame.delay().numer_denom_ms();
        let buffer = frame.buffer();
        let pixels = buffer.pixels().map(|p| Rgb::new(p[0], p[1], p[2])).collect();
        frames.push(Frame::new(buffer.width(), buffer.height(), pixels)?.with_delay(numer / denom.max(1)));
    }

    debug!(path = %path.display(), frames = frames.len(), "loaded gif");
    Ok(FrameSequence::new(frames)?)
}

/// Writes a sequence as a looping animated GIF.
pub fn save<P: AsRef<Path>>(path: P, sequence: &FrameSequence) -> IoResult<()> {
    let path = path.as_ref();
    trace!(path = %path.display(), frames = sequence.len(), "gif::save");

    let mut encoded = Vec::with_capacity(sequence.len());
    for frame in sequence.frames() {
        let mut raw = Vec::with_capacity(frame.pixels.len() * 4);
        for px in &frame.pixels {
            raw.extend_from_slice(&[px.r, px.g, px.b, 255]);
        }
        let rgba = RgbaImage::from_raw(frame.width, frame.height, raw).ok_or_else(|| {
            IoError::Encode(format!("frame buffer does not match {}x{}", frame.width, frame.height))
        })?;
        let delay = Delay::from_numer_denom_ms(frame.delay_ms, 1);
        encoded.push(image::Frame::from_parts(rgba, 0, 0, delay));
    }

    let writer = BufWriter::new(File::create(path)?);
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;
    encoder.encode_frames(encoded).map_err(encode_error)?;
    drop(encoder);

    debug!(path = %path.display(), frames = sequence.len(), "saved gif");
    Ok(())
}
