use crate::error::FrameError;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

//===========================================================================//

/// Length of a message header, in bytes.
pub const HEADER_LEN: usize = 12;
/// The first byte of every message.
pub const SYNC_BYTE: u8 = 0x02;
/// The protocol version spoken by this client.
pub const PROTOCOL_VERSION: u8 = 0x02;
/// The request id the monitor uses for messages that answer no request.
pub const EVENT_REQUEST_ID: u32 = 0xffff_ffff;

//===========================================================================//

/// The fixed-size header that starts every message.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FrameHeader {
    /// Number of body bytes following the header.
    pub body_len: u32,
    /// The message type.
    pub message_type: u8,
    /// The error code (always zero in requests).
    pub error: u8,
    /// The request id.
    pub request_id: u32,
}

impl FrameHeader {
    /// Writes this header.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(SYNC_BYTE)?;
        writer.write_u8(PROTOCOL_VERSION)?;
        writer.write_u32::<LittleEndian>(self.body_len)?;
        writer.write_u8(self.message_type)?;
        writer.write_u8(self.error)?;
        writer.write_u32::<LittleEndian>(self.request_id)?;
        Ok(())
    }

    /// Parses a header from the start of `bytes`.  Returns `Ok(None)` if
    /// fewer than [`HEADER_LEN`] bytes are available.
    pub fn parse(bytes: &[u8]) -> Result<Option<FrameHeader>, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Ok(None);
        }
        if bytes[0] != SYNC_BYTE {
            return Err(FrameError::BadSync(bytes[0]));
        }
        if bytes[1] != PROTOCOL_VERSION {
            return Err(FrameError::BadVersion(bytes[1]));
        }
        Ok(Some(FrameHeader {
            body_len: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
            message_type: bytes[6],
            error: bytes[7],
            request_id: u32::from_le_bytes([
                bytes[8], bytes[9], bytes[10], bytes[11],
            ]),
        }))
    }

    /// Returns the total length of the message this header starts.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.body_len as usize
    }
}

//===========================================================================//

/// A complete message: a header and an owned copy of its body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    /// The header.
    pub header: FrameHeader,
    /// The body.
    pub body: Vec<u8>,
}

impl Frame {
    /// Builds a frame, filling in the body length.
    pub fn new(message_type: u8, error: u8, request_id: u32, body: Vec<u8>) -> Frame {
        let header = FrameHeader {
            body_len: body.len() as u32,
            message_type,
            error,
            request_id,
        };
        Frame { header, body }
    }

    /// Serializes this frame.
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(HEADER_LEN + self.body.len());
        self.header.write_to(&mut bytes)?;
        bytes.write_all(&self.body)?;
        Ok(bytes)
    }
}

//===========================================================================//

/// A fixed-capacity receive arena that reassembles frames from arbitrarily
/// split chunks of the byte stream.
pub struct FrameBuffer {
    data: Box<[u8]>,
    start: usize,
    len: usize,
}

impl FrameBuffer {
    /// Returns an empty buffer that can hold `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> FrameBuffer {
        FrameBuffer {
            data: vec![0u8; capacity.max(HEADER_LEN)].into_boxed_slice(),
            start: 0,
            len: 0,
        }
    }

    /// Returns the number of bytes buffered but not yet consumed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the total capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Discards everything buffered.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    /// Appends as many received bytes as fit, compacting first if needed,
    /// and returns how many were taken.  The caller drains complete frames
    /// with [`FrameBuffer::next_frame`] before pushing the rest.
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        let capacity = self.data.len();
        if self.start + self.len + bytes.len() > capacity && self.start > 0 {
            self.data.copy_within(self.start..self.start + self.len, 0);
            self.start = 0;
        }
        let end = self.start + self.len;
        let taken = bytes.len().min(capacity - end);
        self.data[end..end + taken].copy_from_slice(&bytes[..taken]);
        self.len += taken;
        taken
    }

    /// Removes and returns the next complete frame, if one is buffered.  A
    /// header that fails validation discards the whole buffer.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let pending = &self.data[self.start..self.start + self.len];
        let header = match FrameHeader::parse(pending) {
            Ok(Some(header)) => header,
            Ok(None) => return Ok(None),
            Err(error) => {
                self.clear();
                return Err(error);
            }
        };
        let frame_len = header.frame_len();
        if frame_len > self.data.len() {
            self.clear();
            return Err(FrameError::Overflow {
                needed: frame_len,
                capacity: self.data.len(),
            });
        }
        if pending.len() < frame_len {
            return Ok(None);
        }
        let body = pending[HEADER_LEN..frame_len].to_vec();
        self.start += frame_len;
        self.len -= frame_len;
        if self.len == 0 {
            self.start = 0;
        }
        Ok(Some(Frame { header, body }))
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Frame, FrameBuffer, FrameHeader, HEADER_LEN};
    use crate::error::FrameError;
    use proptest::prelude::*;

    fn frame_bytes(message_type: u8, request_id: u32, body: &[u8]) -> Vec<u8> {
        Frame::new(message_type, 0, request_id, body.to_vec()).to_bytes().unwrap()
    }

    #[test]
    fn header_layout() {
        let bytes = Frame::new(0x31, 0x00, 0x0403_0201, vec![0xaa; 3])
            .to_bytes()
            .unwrap();
        assert_eq!(
            &bytes[..HEADER_LEN],
            &[0x02, 0x02, 3, 0, 0, 0, 0x31, 0x00, 0x01, 0x02, 0x03, 0x04]
        );
        let header = FrameHeader::parse(&bytes).unwrap().unwrap();
        assert_eq!(header.body_len, 3);
        assert_eq!(header.message_type, 0x31);
        assert_eq!(header.request_id, 0x0403_0201);
        assert_eq!(header.frame_len(), 15);
        assert_eq!(FrameHeader::parse(&bytes[..11]), Ok(None));
    }

    #[test]
    fn partial_body_is_not_dispatched() {
        let body: Vec<u8> = (0..200).map(|i| i as u8).collect();
        let bytes = frame_bytes(0x01, 7, &body);
        let mut buffer = FrameBuffer::with_capacity(1024);
        buffer.push(&bytes[..HEADER_LEN + 150]);
        assert_eq!(buffer.next_frame(), Ok(None));
        assert_eq!(buffer.len(), HEADER_LEN + 150);
        buffer.push(&bytes[HEADER_LEN + 150..]);
        let frame = buffer.next_frame().unwrap().unwrap();
        assert_eq!(frame.body, body);
        assert!(buffer.is_empty());
    }

    #[test]
    fn bad_sync_discards_buffer() {
        let mut buffer = FrameBuffer::with_capacity(256);
        let mut bytes = frame_bytes(0x62, 1, &[0x00, 0xc0]);
        bytes[0] = 0x41;
        buffer.push(&bytes);
        assert_eq!(buffer.next_frame(), Err(FrameError::BadSync(0x41)));
        assert!(buffer.is_empty());
        // The next clean frame is read normally.
        buffer.push(&frame_bytes(0x63, 2, &[0x00, 0xc0]));
        let frame = buffer.next_frame().unwrap().unwrap();
        assert_eq!(frame.header.message_type, 0x63);
    }

    #[test]
    fn bad_version_discards_buffer() {
        let mut buffer = FrameBuffer::with_capacity(256);
        let mut bytes = frame_bytes(0x62, 1, &[]);
        bytes[1] = 0x01;
        buffer.push(&bytes);
        assert_eq!(buffer.next_frame(), Err(FrameError::BadVersion(0x01)));
        assert!(buffer.is_empty());
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut buffer = FrameBuffer::with_capacity(32);
        let bytes = frame_bytes(0x01, 1, &[0u8; 40]);
        assert_eq!(buffer.push(&bytes), 32);
        assert_eq!(
            buffer.next_frame(),
            Err(FrameError::Overflow { needed: 52, capacity: 32 })
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn full_buffer_drains_before_taking_the_rest() {
        let mut buffer = FrameBuffer::with_capacity(32);
        let first = frame_bytes(0x62, 1, &[1, 2, 3, 4]);
        let second = frame_bytes(0x63, 2, &[5, 6, 7, 8]);
        assert_eq!(buffer.push(&first[..10]), 10);
        let mut rest = first[10..].to_vec();
        rest.extend(&second);
        rest.extend(&second);
        // Finishes both buffered frames, but only part of the chunk fits.
        let taken = buffer.push(&rest);
        assert_eq!(taken, 22);
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![1, 2, 3, 4]));
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![5, 6, 7, 8]));
        assert_eq!(buffer.next_frame(), Ok(None));
        assert_eq!(buffer.push(&rest[taken..]), 16);
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![5, 6, 7, 8]));
        assert!(buffer.is_empty());
    }

    #[test]
    fn compacts_when_tail_is_full() {
        let mut buffer = FrameBuffer::with_capacity(40);
        let first = frame_bytes(0x62, 1, &[1, 2, 3, 4]);
        let second = frame_bytes(0x63, 2, &[5, 6, 7, 8]);
        buffer.push(&first);
        buffer.push(&second[..10]);
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![1, 2, 3, 4]));
        buffer.push(&second[10..]);
        // Only fits after moving the pending frame to the front.
        buffer.push(&first);
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![5, 6, 7, 8]));
        assert_eq!(buffer.next_frame().unwrap().map(|f| f.body), Some(vec![1, 2, 3, 4]));
        assert_eq!(buffer.next_frame(), Ok(None));
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_frames(
            bodies in prop::collection::vec(
                prop::collection::vec(any::<u8>(), 0..64), 1..8),
            chunk_size in 1usize..40,
        ) {
            let mut stream = Vec::new();
            for (index, body) in bodies.iter().enumerate() {
                stream.extend(frame_bytes(0x01, index as u32, body));
            }
            let mut buffer = FrameBuffer::with_capacity(1024);
            let mut received = Vec::new();
            for chunk in stream.chunks(chunk_size) {
                prop_assert_eq!(buffer.push(chunk), chunk.len());
                while let Some(frame) = buffer.next_frame().unwrap() {
                    received.push(frame);
                }
            }
            prop_assert_eq!(received.len(), bodies.len());
            for (index, (frame, body)) in received.iter().zip(&bodies).enumerate() {
                prop_assert_eq!(frame.header.request_id, index as u32);
                prop_assert_eq!(&frame.body, body);
            }
            prop_assert!(buffer.is_empty());
        }
    }
}

//===========================================================================//
