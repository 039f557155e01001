//! Backpatched headers and multi-packet pagination.
//!
//! Both algorithms write a placeholder first, emit the variable-length body,
//! then rewind to fill in the real value and return the cursor to the end of
//! the buffer. Values that do not fit their field are reported, never
//! wrapped.

use crate::error::{EncodeResult, ProtocolError};
use crate::writer::PacketWriter;
use tracing::warn;

/// Width and byte order of a backpatched header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U8,
    U16,
    U16Le,
    U32,
}

impl FieldWidth {
    pub fn bytes(self) -> usize {
        match self {
            FieldWidth::U8 => 1,
            FieldWidth::U16 | FieldWidth::U16Le => 2,
            FieldWidth::U32 => 4,
        }
    }

    pub fn max(self) -> usize {
        match self {
            FieldWidth::U8 => u8::MAX as usize,
            FieldWidth::U16 | FieldWidth::U16Le => u16::MAX as usize,
            FieldWidth::U32 => u32::MAX as usize,
        }
    }

    fn write(self, w: &mut PacketWriter, value: usize) {
        match self {
            FieldWidth::U8 => w.write_u8(value as u8),
            FieldWidth::U16 => w.write_u16(value as u16),
            FieldWidth::U16Le => w.write_u16_le(value as u16),
            FieldWidth::U32 => w.write_u32(value as u32),
        }
    }
}

/// A header field whose value is known only after the body is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backpatch {
    start: usize,
    width: FieldWidth,
}

impl Backpatch {
    /// Write a zero placeholder at the cursor and remember where it is.
    pub fn reserve(w: &mut PacketWriter, width: FieldWidth) -> Self {
        let start = w.position();
        width.write(w, 0);
        Self { start, width }
    }

    /// Refer to a placeholder that was written earlier at a known offset.
    pub fn at(start: usize, width: FieldWidth) -> Self {
        Self { start, width }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn width(&self) -> FieldWidth {
        self.width
    }

    /// Bytes written after the field so far.
    pub fn body_len(&self, w: &PacketWriter) -> usize {
        w.position().saturating_sub(self.start + self.width.bytes())
    }

    pub fn fits(&self, value: usize) -> bool {
        value <= self.width.max()
    }

    /// Rewrite the field with `value` and leave the cursor at the end of
    /// the buffer.
    pub fn patch(&self, w: &mut PacketWriter, value: usize) -> EncodeResult<()> {
        if !self.fits(value) {
            warn!(
                kind = %w.kind(),
                "Value {} overflows {:?} header at offset {}",
                value,
                self.width,
                self.start
            );
            return Err(ProtocolError::FieldOverflow {
                value,
                width: self.width,
            });
        }
        w.set_position(self.start)?;
        self.width.write(w, value);
        w.seek_end();
        Ok(())
    }

    /// Patch the field with the length of everything written after it.
    pub fn patch_len(&self, w: &mut PacketWriter) -> EncodeResult<usize> {
        let len = self.body_len(w);
        self.patch(w, len)?;
        Ok(len)
    }
}

/// What a bounded block's prefix counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Byte length of the block body.
    Length,
    /// Number of entries in the block.
    Count,
}

/// Totals reported when a bounded block is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockSummary {
    pub entries: usize,
    pub dropped: usize,
    /// The value written into the prefix.
    pub value: usize,
}

/// A length- or count-prefixed run of entries that never overflows its
/// prefix. The first entry that would push the prefix out of range is
/// taken back and it and every later entry are dropped, so what remains
/// on the wire is always well formed.
#[derive(Debug)]
pub struct BoundedBlock {
    prefix: Backpatch,
    bound: Bound,
    max_packet: Option<usize>,
    entries: usize,
    dropped: usize,
}

impl BoundedBlock {
    pub fn begin(w: &mut PacketWriter, width: FieldWidth, bound: Bound) -> Self {
        Self {
            prefix: Backpatch::reserve(w, width),
            bound,
            max_packet: None,
            entries: 0,
            dropped: 0,
        }
    }

    /// Also drop entries that would grow the whole packet body past
    /// `max_len` bytes.
    pub fn within_packet(mut self, max_len: usize) -> Self {
        self.max_packet = Some(max_len);
        self
    }

    /// Write one entry. Returns `false` when the entry was dropped.
    pub fn push(&mut self, w: &mut PacketWriter, write: impl FnOnce(&mut PacketWriter)) -> bool {
        if self.dropped > 0 {
            self.dropped += 1;
            return false;
        }
        let entry_start = w.position();
        write(w);
        let packet_fits = self.max_packet.map_or(true, |max| w.len() <= max);
        if packet_fits && self.prefix.fits(self.value_with(w, self.entries + 1)) {
            self.entries += 1;
            true
        } else {
            w.truncate(entry_start);
            self.dropped += 1;
            false
        }
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    fn value_with(&self, w: &PacketWriter, entries: usize) -> usize {
        match self.bound {
            Bound::Length => self.prefix.body_len(w),
            Bound::Count => entries,
        }
    }

    pub fn finish(self, w: &mut PacketWriter) -> EncodeResult<BlockSummary> {
        if self.dropped > 0 {
            warn!(
                kind = %w.kind(),
                "{:?}-prefixed block full after {} entries, dropped {}",
                self.bound,
                self.entries,
                self.dropped
            );
        }
        let value = self.value_with(w, self.entries);
        self.prefix.patch(w, value)?;
        Ok(BlockSummary {
            entries: self.entries,
            dropped: self.dropped,
            value,
        })
    }
}

/// Budget for a paginated list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Once a page's body reaches this many bytes it is closed.
    pub budget: usize,
    /// Size of the index space; entries past it are dropped.
    pub max_entries: usize,
}

/// Header values for one page, handed to the dialect to backpatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page: usize,
    /// Source index of the first entry on this page.
    pub first_index: usize,
    pub count: usize,
    /// `true` on every page but the last.
    pub more: bool,
}

/// Split `entries` across as many packets as the budget requires.
///
/// `open_page` starts a packet and writes header placeholders,
/// `write_entry` appends one entry, `close_page` backpatches the header.
/// A page is closed right after the entry that reaches the budget, so a
/// page overshoots by at most one entry and is never empty. An empty
/// source still yields one (empty, terminal) page.
pub fn paginate<T, O, E, C>(
    entries: &[T],
    limits: PageLimits,
    mut open_page: O,
    mut write_entry: E,
    mut close_page: C,
) -> EncodeResult<Vec<PacketWriter>>
where
    O: FnMut(usize) -> EncodeResult<PacketWriter>,
    E: FnMut(&mut PacketWriter, usize, &T),
    C: FnMut(&mut PacketWriter, PageHeader) -> EncodeResult<()>,
{
    let accepted = entries.len().min(limits.max_entries);
    if accepted < entries.len() {
        warn!(
            "Paginated list of {} entries exceeds index space of {}, dropping {}",
            entries.len(),
            limits.max_entries,
            entries.len() - accepted
        );
    }

    let mut pages = Vec::new();
    let mut page = 0;
    let mut first_index = 0;
    let mut count = 0;
    let mut writer = open_page(page)?;

    for (index, entry) in entries[..accepted].iter().enumerate() {
        write_entry(&mut writer, index, entry);
        count += 1;
        let remaining = index + 1 < accepted;
        if remaining && writer.position() >= limits.budget {
            close_page(
                &mut writer,
                PageHeader {
                    page,
                    first_index,
                    count,
                    more: true,
                },
            )?;
            pages.push(writer);
            page += 1;
            first_index = index + 1;
            count = 0;
            writer = open_page(page)?;
        }
    }

    close_page(
        &mut writer,
        PageHeader {
            page,
            first_index,
            count,
            more: false,
        },
    )?;
    pages.push(writer);
    Ok(pages)
}
