//! Little-endian FlatBuffers-style buffer runtime.
//!
//! This is the reference the generated Julia code is written against: the
//! `Builder` assembles a buffer back-to-front, the `Table` reads it
//! front-to-back at positive offsets. The tests in this workspace drive the
//! generator's plans through these two types to check that accessors and
//! builders agree on layout.

use crate::schema::ScalarType;
use crate::value::ScalarValue;

pub type UOffset = u32;
pub type SOffset = i32;
pub type VOffset = u16;

pub const SIZE_UOFFSET: usize = 4;
pub const SIZE_SOFFSET: usize = 4;
pub const SIZE_VOFFSET: usize = 2;

/// The vtable starts with its own size and the object's size.
pub const VTABLE_METADATA_FIELDS: usize = 2;

/// Byte offset inside a vtable of the entry for `slot`.
pub fn field_index_to_offset(slot: usize) -> VOffset {
    ((VTABLE_METADATA_FIELDS + slot) * SIZE_VOFFSET) as VOffset
}

/// A back-to-front buffer builder.
///
/// Example usage:
///
/// ```
/// use flatjl_schema::{Builder, Table};
///
/// let mut b = Builder::new();
/// let name = b.create_string("orc");
/// b.start_object(1);
/// b.prepend_offset_slot(0, name, 0);
/// let root = b.end_object();
/// b.finish(root);
///
/// let t = Table::root(b.finished_data());
/// let o = t.offset(flatjl_schema::field_index_to_offset(0));
/// assert_eq!(t.string(o as usize + t.pos()), "orc");
/// ```
pub struct Builder {
    buf:        Vec<u8>,
    space:      usize,
    minalign:   usize,
    vtable:     Vec<UOffset>,
    object_end: UOffset,
    nested:     bool,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Builder {
        let capacity = capacity.max(1);
        Builder {
            buf:        vec![0; capacity],
            space:      capacity,
            minalign:   1,
            vtable:     Vec::new(),
            object_end: 0,
            nested:     false,
        }
    }

    /// Bytes written so far, measured from the back of the buffer.
    pub fn offset(&self) -> UOffset {
        (self.buf.len() - self.space) as UOffset
    }

    /// The written region. Only meaningful once `finish` has run, but usable
    /// for inspection before that.
    pub fn finished_data(&self) -> &[u8] {
        &self.buf[self.space..]
    }

    fn grow(&mut self) {
        let old_len = self.buf.len();
        let new_len = old_len * 2;
        let mut grown = vec![0; new_len];
        grown[new_len - old_len..].copy_from_slice(&self.buf);
        self.buf = grown;
        self.space += new_len - old_len;
    }

    /// Writes `n` zero bytes.
    pub fn pad(&mut self, n: usize) {
        while self.space < n {
            self.grow();
        }
        for _ in 0..n {
            self.space -= 1;
            self.buf[self.space] = 0;
        }
    }

    /// Aligns so that after writing `additional` bytes the next `size`-byte
    /// value lands on a `size` boundary, and makes room for both.
    pub fn prep(&mut self, size: usize, additional: usize) {
        if size > self.minalign {
            self.minalign = size;
        }
        let used = self.buf.len() - self.space + additional;
        let align_size = (!used).wrapping_add(1) & (size - 1);
        while self.space < align_size + size + additional {
            self.grow();
        }
        self.pad(align_size);
    }

    fn place(&mut self, bytes: &[u8]) {
        self.space -= bytes.len();
        self.buf[self.space..self.space + bytes.len()].copy_from_slice(bytes);
    }

    pub fn prepend(&mut self, value: ScalarValue) {
        self.prep(value.size(), 0);
        self.place(&value.to_le_bytes());
    }

    /// Prepends an offset, converted to be relative to where it is written.
    pub fn prepend_uoffset(&mut self, off: UOffset) {
        self.prep(SIZE_UOFFSET, 0);
        assert!(off <= self.offset(), "offset {} points past the written region", off);
        let relative = self.offset() - off + SIZE_UOFFSET as UOffset;
        self.place(&relative.to_le_bytes());
    }

    pub fn start_object(&mut self, num_fields: usize) {
        assert!(!self.nested, "start_object called inside another object or vector");
        self.vtable = vec![0; num_fields];
        self.object_end = self.offset();
        self.nested = true;
    }

    fn slot(&mut self, slot: usize) {
        self.vtable[slot] = self.offset();
    }

    /// Writes a scalar field unless it equals the default.
    pub fn prepend_slot(&mut self, slot: usize, value: ScalarValue, default: ScalarValue) {
        if value != default {
            self.prepend(value);
            self.slot(slot);
        }
    }

    pub fn prepend_offset_slot(&mut self, slot: usize, off: UOffset, default: UOffset) {
        if off != default {
            self.prepend_uoffset(off);
            self.slot(slot);
        }
    }

    /// Records a struct that was just written inline.
    pub fn prepend_struct_slot(&mut self, slot: usize, off: UOffset, default: UOffset) {
        if off != default {
            assert_eq!(off, self.offset(), "structs must be written inline, right before their slot");
            self.slot(slot);
        }
    }

    /// Writes the vtable for the current object and returns the object's offset.
    pub fn end_object(&mut self) -> UOffset {
        assert!(self.nested, "end_object called without start_object");

        self.prepend(ScalarValue::Int(0));
        let object_offset = self.offset();

        let mut used = self.vtable.len();
        while used > 0 && self.vtable[used - 1] == 0 {
            used -= 1;
        }
        for i in (0..used).rev() {
            let entry = if self.vtable[i] != 0 {
                (object_offset - self.vtable[i]) as VOffset
            } else {
                0
            };
            self.prepend(ScalarValue::UShort(entry));
        }
        self.prepend(ScalarValue::UShort((object_offset - self.object_end) as VOffset));
        self.prepend(ScalarValue::UShort(field_index_to_offset(used)));

        let vtable_offset = self.offset();
        let at = self.buf.len() - object_offset as usize;
        let soffset = vtable_offset as SOffset - object_offset as SOffset;
        self.buf[at..at + SIZE_SOFFSET].copy_from_slice(&soffset.to_le_bytes());

        self.vtable.clear();
        self.nested = false;
        object_offset
    }

    pub fn start_vector(&mut self, elem_size: usize, num_elems: usize, alignment: usize) {
        assert!(!self.nested, "start_vector called inside another object or vector");
        self.nested = true;
        self.prep(SIZE_UOFFSET, elem_size * num_elems);
        self.prep(alignment, elem_size * num_elems);
    }

    pub fn end_vector(&mut self, num_elems: usize) -> UOffset {
        assert!(self.nested, "end_vector called without start_vector");
        self.place(&(num_elems as UOffset).to_le_bytes());
        self.nested = false;
        self.offset()
    }

    pub fn create_string(&mut self, s: &str) -> UOffset {
        assert!(!self.nested, "create_string called inside another object or vector");
        self.nested = true;
        self.prep(SIZE_UOFFSET, s.len() + 1);
        self.place(&[0]);
        self.place(s.as_bytes());
        self.end_vector(s.len())
    }

    pub fn finish(&mut self, root: UOffset) {
        assert!(!self.nested, "finish called with an open object or vector");
        let align = self.minalign;
        self.prep(align, SIZE_UOFFSET);
        self.prepend_uoffset(root);
    }
}

/// A read-only view of one table or struct inside a finished buffer.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    bytes: &'a [u8],
    pos:   usize,
}

impl<'a> Table<'a> {
    pub fn new(bytes: &'a [u8], pos: usize) -> Table<'a> {
        Table { bytes, pos }
    }

    /// The root table of a finished buffer.
    pub fn root(bytes: &'a [u8]) -> Table<'a> {
        let pos = read_uoffset(bytes, 0) as usize;
        Table { bytes, pos }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Looks up a vtable entry. Zero means the field is absent.
    pub fn offset(&self, vtable_offset: VOffset) -> VOffset {
        let soffset = i32::from_le_bytes(self.word(self.pos));
        let vtable = (self.pos as i64 - soffset as i64) as usize;
        let vtable_size = u16::from_le_bytes([self.bytes[vtable], self.bytes[vtable + 1]]);
        if vtable_offset < vtable_size {
            let at = vtable + vtable_offset as usize;
            u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]])
        } else {
            0
        }
    }

    /// Follows the uoffset stored at absolute position `off`.
    pub fn indirect(&self, off: usize) -> usize {
        off + read_uoffset(self.bytes, off) as usize
    }

    pub fn get(&self, off: usize, ty: ScalarType) -> ScalarValue {
        ScalarValue::from_le_bytes(&self.bytes[off..], ty)
            .unwrap_or_else(|| panic!("scalar read at {} runs past the buffer", off))
    }

    /// Reads the length-prefixed string referenced from absolute position `off`.
    pub fn string(&self, off: usize) -> &'a str {
        let start = self.indirect(off);
        let len = read_uoffset(self.bytes, start) as usize;
        let data = &self.bytes[start + SIZE_UOFFSET..start + SIZE_UOFFSET + len];
        std::str::from_utf8(data).unwrap_or_else(|e| panic!("invalid utf-8 in string: {}", e))
    }

    /// Start of the element data of the vector referenced from vtable-relative `off`.
    pub fn vector(&self, off: usize) -> usize {
        self.indirect(off + self.pos) + SIZE_UOFFSET
    }

    pub fn vector_len(&self, off: usize) -> usize {
        let start = self.indirect(off + self.pos);
        read_uoffset(self.bytes, start) as usize
    }

    fn word(&self, at: usize) -> [u8; 4] {
        [self.bytes[at], self.bytes[at + 1], self.bytes[at + 2], self.bytes[at + 3]]
    }
}

fn read_uoffset(bytes: &[u8], at: usize) -> UOffset {
    UOffset::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn vtable_offsets() {
    assert_eq!(field_index_to_offset(0), 4);
    assert_eq!(field_index_to_offset(1), 6);
    assert_eq!(field_index_to_offset(5), 14);
}

#[test]
fn prep_aligns_the_next_write() {
    let mut b = Builder::with_capacity(1);
    b.prepend(ScalarValue::UByte(7));
    b.prepend(ScalarValue::Int(-1));
    assert_eq!(b.offset(), 8);
    assert_eq!(b.finished_data(), &[0xff, 0xff, 0xff, 0xff, 0, 0, 0, 7]);
}

#[test]
fn pad_writes_zero_bytes() {
    let mut b = Builder::new();
    b.prepend(ScalarValue::UByte(1));
    b.pad(3);
    assert_eq!(b.finished_data(), &[0, 0, 0, 1]);
}

#[test]
fn strings_are_length_prefixed_and_terminated() {
    let mut b = Builder::new();
    let s = b.create_string("hi");
    assert_eq!(s, 8);
    assert_eq!(b.finished_data(), &[2, 0, 0, 0, b'h', b'i', 0, 0]);
}

#[test]
fn default_scalars_are_elided() {
    let mut b = Builder::new();
    b.start_object(2);
    b.prepend_slot(0, ScalarValue::Short(0), ScalarValue::Short(0));
    b.prepend_slot(1, ScalarValue::Short(9), ScalarValue::Short(0));
    let root = b.end_object();
    b.finish(root);

    let t = Table::root(b.finished_data());
    assert_eq!(t.offset(field_index_to_offset(0)), 0);
    let o = t.offset(field_index_to_offset(1)) as usize;
    assert_ne!(o, 0);
    assert_eq!(t.get(o + t.pos(), ScalarType::Short), ScalarValue::Short(9));
}

#[test]
fn slots_past_the_vtable_read_as_absent() {
    let mut b = Builder::new();
    b.start_object(4);
    b.prepend_slot(0, ScalarValue::Bool(true), ScalarValue::Bool(false));
    let root = b.end_object();
    b.finish(root);

    let t = Table::root(b.finished_data());
    assert_ne!(t.offset(field_index_to_offset(0)), 0);
    assert_eq!(t.offset(field_index_to_offset(3)), 0);
}

#[test]
fn vectors_carry_their_length() {
    let mut b = Builder::new();
    b.start_vector(2, 3, 2);
    for v in [30i16, 20, 10] {
        b.prepend(ScalarValue::Short(v));
    }
    let vec = b.end_vector(3);
    b.start_object(1);
    b.prepend_offset_slot(0, vec, 0);
    let root = b.end_object();
    b.finish(root);

    let t = Table::root(b.finished_data());
    let o = t.offset(field_index_to_offset(0)) as usize;
    assert_eq!(t.vector_len(o), 3);
    let start = t.vector(o);
    let read: Vec<_> = (0..3).map(|i| t.get(start + 2 * i, ScalarType::Short)).collect();
    assert_eq!(read, vec![ScalarValue::Short(10), ScalarValue::Short(20), ScalarValue::Short(30)]);
}
