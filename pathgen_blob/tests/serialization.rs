//! Integration tests for blob serialization and aggregate files.

use std::io::Cursor;

use pathgen_blob::{
    swap_u32_words, Blob, BlobAggregate, BlobError, BlobTypeRegistry, Endianness, PayloadReader,
    PayloadSwapper, PayloadWriter, Result,
};
use pathgen_core::{CellBox, CellPos, Guid};
use proptest::prelude::*;

/// A blob exercising every payload field kind.
#[derive(Debug, Clone, PartialEq)]
struct Record {
    guid: Guid,
    cell_box: CellBox,
    label: String,
    values: Vec<u32>,
}

impl Blob for Record {
    const BLOB_TYPE: &'static str = "Record";
    const BLOB_VERSION: u32 = 4;

    fn write_payload(&self, w: &mut PayloadWriter<'_>) -> Result<()> {
        w.write_guid(&self.guid);
        w.write_cell_box(&self.cell_box);
        w.write_str(&self.label);
        w.write_u32(self.values.len() as u32);
        for &value in &self.values {
            w.write_u32(value);
        }
        Ok(())
    }

    fn read_payload(r: &mut PayloadReader<'_>) -> Result<Self> {
        let guid = r.read_guid()?;
        let cell_box = r.read_cell_box()?;
        let label = r.read_str()?;
        let count = r.read_u32()?;
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(r.read_u32()?);
        }
        Ok(Self {
            guid,
            cell_box,
            label,
            values,
        })
    }

    fn swap_payload(bytes: &mut [u8], from: Endianness) -> Result<()> {
        let mut swapper = PayloadSwapper::new(bytes, from);
        swapper.skip_bytes(16)?;
        swapper.swap_u32_run(4)?;
        swapper.swap_str()?;
        let count = swapper.swap_u32()? as usize;
        swapper.swap_u32_run(count)
    }
}

/// A scalar-only blob using the word-swap shortcut.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Scalars {
    a: u32,
    b: i32,
    c: f32,
}

impl Blob for Scalars {
    const BLOB_TYPE: &'static str = "Scalars";
    const BLOB_VERSION: u32 = 1;

    fn write_payload(&self, w: &mut PayloadWriter<'_>) -> Result<()> {
        w.write_u32(self.a);
        w.write_i32(self.b);
        w.write_f32(self.c);
        Ok(())
    }

    fn read_payload(r: &mut PayloadReader<'_>) -> Result<Self> {
        Ok(Self {
            a: r.read_u32()?,
            b: r.read_i32()?,
            c: r.read_f32()?,
        })
    }

    fn swap_payload(bytes: &mut [u8], _from: Endianness) -> Result<()> {
        swap_u32_words(bytes)
    }
}

fn registry() -> BlobTypeRegistry {
    let mut registry = BlobTypeRegistry::new();
    registry.register::<Record>().unwrap();
    registry.register::<Scalars>().unwrap();
    registry
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        any::<[u8; 16]>(),
        -1000i32..1000,
        -1000i32..1000,
        0i32..50,
        0i32..50,
        "[a-z0-9_]{0,24}",
        prop::collection::vec(any::<u32>(), 0..32),
    )
        .prop_map(|(guid, min_x, min_y, w, h, label, values)| Record {
            guid: Guid::from_bytes(guid),
            cell_box: CellBox::new(
                CellPos::new(min_x, min_y),
                CellPos::new(min_x + w, min_y + h),
            ),
            label,
            values,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Swapping a payload's byte order twice restores it bit for bit.
    #[test]
    fn swap_twice_is_identity(record in record_strategy()) {
        for write_order in [Endianness::Little, Endianness::Big] {
            let mut payload = Vec::new();
            let mut w = PayloadWriter::new(&mut payload, write_order);
            record.write_payload(&mut w).unwrap();
            let original = payload.clone();

            Record::swap_payload(&mut payload, write_order).unwrap();
            Record::swap_payload(&mut payload, write_order.swapped()).unwrap();
            prop_assert_eq!(&payload, &original);
        }
    }

    /// A payload written in one order and swapped reads back in the other.
    #[test]
    fn swap_converts_between_orders(record in record_strategy()) {
        let mut payload = Vec::new();
        let mut w = PayloadWriter::new(&mut payload, Endianness::Big);
        record.write_payload(&mut w).unwrap();

        Record::swap_payload(&mut payload, Endianness::Big).unwrap();

        let mut r = PayloadReader::new(&payload, Endianness::Little);
        let back = Record::read_payload(&mut r).unwrap();
        prop_assert_eq!(back, record);
        prop_assert_eq!(r.remaining(), 0);
    }

    /// Aggregates round trip through both byte orders.
    #[test]
    fn aggregate_roundtrips_any_order(
        records in prop::collection::vec(record_strategy(), 0..6),
        big in any::<bool>(),
    ) {
        let registry = registry();
        let mut aggregate = BlobAggregate::new(&registry);
        for record in &records {
            aggregate.add_blob(record).unwrap();
        }
        aggregate.add_blob(&Scalars { a: 1, b: -2, c: 0.5 }).unwrap();

        let order = if big { Endianness::Big } else { Endianness::Little };
        let mut buffer = Vec::new();
        aggregate.save(&mut buffer, order).unwrap();
        prop_assert_eq!(buffer.len(), aggregate.compute_byte_size());

        let loaded = BlobAggregate::load(&registry, &mut Cursor::new(buffer)).unwrap();
        let back: Vec<Record> = loaded.decode_all().unwrap();
        prop_assert_eq!(back, records);
        let scalars: Vec<Scalars> = loaded.decode_all().unwrap();
        prop_assert_eq!(scalars, vec![Scalars { a: 1, b: -2, c: 0.5 }]);
    }
}

#[test]
fn foreign_file_with_unregistered_type_fails() {
    let registry = registry();
    let mut aggregate = BlobAggregate::new(&registry);
    aggregate
        .add_blob(&Scalars {
            a: 7,
            b: 7,
            c: 7.0,
        })
        .unwrap();

    let mut buffer = Vec::new();
    aggregate
        .save(&mut buffer, Endianness::host().swapped())
        .unwrap();

    // A reader that only knows Record cannot convert the Scalars payload.
    let mut partial = BlobTypeRegistry::new();
    partial.register::<Record>().unwrap();
    assert!(matches!(
        BlobAggregate::load(&partial, &mut Cursor::new(buffer)),
        Err(BlobError::UnregisteredBlobType { .. })
    ));
}

#[test]
fn empty_aggregate_roundtrips() {
    let registry = registry();
    let aggregate = BlobAggregate::new(&registry);
    let mut buffer = Vec::new();
    aggregate.save(&mut buffer, Endianness::Little).unwrap();
    assert_eq!(buffer.len(), pathgen_blob::FILE_HEADER_SIZE);

    let loaded = BlobAggregate::load(&registry, &mut Cursor::new(buffer)).unwrap();
    assert_eq!(loaded.blob_count(), 0);
}

#[test]
fn saved_file_loads_from_disk() {
    let registry = registry();
    let mut aggregate = BlobAggregate::new(&registry);
    aggregate
        .add_blob(&Scalars {
            a: 3,
            b: -4,
            c: 5.5,
        })
        .unwrap();

    let path = std::env::temp_dir().join(format!(
        "pathgen_blob_serialization_{}.pathdata",
        std::process::id()
    ));
    aggregate.save_to_file(&path, Endianness::Big).unwrap();

    let loaded = BlobAggregate::load_from_file(&registry, &path).unwrap();
    let scalars: Vec<Scalars> = loaded.decode_all().unwrap();
    assert_eq!(
        scalars,
        vec![Scalars {
            a: 3,
            b: -4,
            c: 5.5,
        }]
    );
    let _ = std::fs::remove_file(&path);
}
