use std::io::Write;

use crate::cache::store::RecordStore;
use crate::core::record::RecordData;
use crate::export::ExportError;
use crate::index::CoordinateIndex;

/// Write the indexed variant set as a VCF-like body.
///
/// One line per primary index row, in index order; the allele-less
/// secondary rows of rearrangements are skipped, as are variants without
/// coordinates (they were never indexed). Missing REF/ALT columns render
/// as `.`. This consumer reads the store and index only; it never mutates
/// either.
pub fn write_vcf<W: Write>(
    store: &RecordStore,
    index: &CoordinateIndex,
    out: &mut W,
) -> Result<usize, ExportError> {
    writeln!(out, "##fileformat=VCFv4.2")?;
    writeln!(out, "##source=varkb {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO")?;

    let mut written = 0;
    for row in index.rows() {
        if row.alt.is_none() && row.ref_bases.is_none() {
            continue;
        }
        let record = store
            .get(&row.record)
            .ok_or(ExportError::UnknownRecord(row.record))?;
        let gene = match &record.data {
            RecordData::Variant(v) => v
                .gene
                .known()
                .and_then(|gid| store.get(gid))
                .map(|g| g.label()),
            _ => None,
        };
        let mut info = format!("VARIANT={}", record.label().replace(' ', "_"));
        if let Some(gene) = gene {
            info.push_str(&format!(";GENE={gene}"));
        }
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t.\t.\t{}",
            row.chromosome,
            row.start,
            row.record,
            row.ref_bases.as_deref().unwrap_or("."),
            row.alt.as_deref().unwrap_or("."),
            info
        )?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::{Coordinates, Field, Record, VariantData};
    use crate::core::types::{RecordId, RecordKind};

    fn fixture() -> (RecordStore, CoordinateIndex) {
        let mut store = RecordStore::new();
        let mut data = VariantData::default();
        data.name = Field::Known("V600E".to_string());
        data.coordinates = Field::Known(Coordinates {
            chromosome: Some("7".to_string()),
            start: Some(140_453_136),
            stop: Some(140_453_136),
            alt: Some("T".to_string()),
            ref_bases: Some("A".to_string()),
            ..Default::default()
        });
        store.put(Record::complete(
            RecordId::new(RecordKind::Variant, 12),
            RecordData::Variant(data),
        ));
        let index = CoordinateIndex::build(&store);
        (store, index)
    }

    #[test]
    fn test_vcf_body_line() {
        let (store, index) = fixture();
        let mut out = Vec::new();
        let written = write_vcf(&store, &index, &mut out).unwrap();
        assert_eq!(written, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("##fileformat=VCFv4.2"));
        assert!(text.contains("7\t140453136\tvariant:12\tA\tT\t.\t.\tVARIANT=V600E"));
    }
}
