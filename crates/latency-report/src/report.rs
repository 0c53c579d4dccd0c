use measurements::{format_bytes, Measurement};
use std::cmp::Ordering;
use std::io;
use std::io::Write;

/// A column of a summary table: its header label and how a cell is formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    BufferSize,
    PageSize,
    PageEntries,
    Latency,
    L1dMissRate,
    L2MissRate,
    L3MissRate,
    TlbMissRate,
}

impl Column {
    fn label(self) -> &'static str {
        match self {
            Column::BufferSize => "BufferSize",
            Column::PageSize => "PageSize",
            Column::PageEntries => "PageEntries",
            Column::Latency => "Latency (cycles)",
            Column::L1dMissRate => "L1DMiss (%)",
            Column::L2MissRate => "L2Miss (%)",
            Column::L3MissRate => "L3Miss (%)",
            Column::TlbMissRate => "TLBMiss (%)",
        }
    }

    fn format(self, m: &Measurement) -> String {
        match self {
            Column::BufferSize => format_bytes(m.raw.buffer_size),
            Column::PageSize => format_bytes(m.raw.page_size),
            Column::PageEntries => m.page_entries.to_string(),
            Column::Latency => format!("{:.2}", m.latency),
            Column::L1dMissRate => format!("{:.2}", m.l1d_miss_rate),
            Column::L2MissRate => format!("{:.2}", m.l2_miss_rate),
            Column::L3MissRate => format!("{:.2}", m.l3_miss_rate),
            Column::TlbMissRate => format!("{:.2}", m.tlb_miss_rate),
        }
    }
}

/// One fixed analysis view: which rows it selects, how they are ordered, and
/// which columns it shows.
struct View {
    title: &'static str,
    /// Rows are selected by their PaddedElementSize matching this stride
    stride: u64,
    sort: fn(&Measurement, &Measurement) -> Ordering,
    columns: &'static [Column],
}

fn cmp_buffer_size(a: &Measurement, b: &Measurement) -> Ordering {
    a.raw.buffer_size.cmp(&b.raw.buffer_size)
}

// BufferSize ascending, then PageSize descending so configurations run from
// coarsest to finest page granularity within each buffer size.
fn cmp_buffer_size_then_page_size_desc(a: &Measurement, b: &Measurement) -> Ordering {
    a.raw
        .buffer_size
        .cmp(&b.raw.buffer_size)
        .then(b.raw.page_size.cmp(&a.raw.page_size))
}

/// Isolates cache hierarchy behavior: a 64 byte stride touches a new cache
/// line on every load while staying within a page.
const CACHE_VIEW: View = View {
    title: "Cache Hierarchy Analysis (PaddedElementSize: 64 Bytes)",
    stride: 64,
    sort: cmp_buffer_size,
    columns: &[
        Column::BufferSize,
        Column::Latency,
        Column::L1dMissRate,
        Column::L2MissRate,
        Column::L3MissRate,
        Column::TlbMissRate,
    ],
};

/// Isolates TLB behavior: a 4096 byte stride touches a new page on every load.
const TLB_VIEW: View = View {
    title: "TLB Analysis (PaddedElementSize: 4096 Bytes)",
    stride: 4096,
    sort: cmp_buffer_size_then_page_size_desc,
    columns: &[
        Column::BufferSize,
        Column::PageSize,
        Column::PageEntries,
        Column::Latency,
        Column::L1dMissRate,
        Column::L2MissRate,
        Column::L3MissRate,
        Column::TlbMissRate,
    ],
};

/// Writes the cache hierarchy table for `dataset`, or nothing if no row
/// matches the cache view's stride.
pub fn print_cache_table<W: Write>(out: &mut W, dataset: &[Measurement]) -> io::Result<()> {
    print_view(out, &CACHE_VIEW, dataset)
}

/// Writes the TLB table for `dataset`, or nothing if no row matches the TLB
/// view's stride.
pub fn print_tlb_table<W: Write>(out: &mut W, dataset: &[Measurement]) -> io::Result<()> {
    print_view(out, &TLB_VIEW, dataset)
}

fn print_view<W: Write>(out: &mut W, view: &View, dataset: &[Measurement]) -> io::Result<()> {
    match render_view(view, dataset) {
        Some(table) => out.write_all(table.as_bytes()),
        None => Ok(()),
    }
}

/// Runs one view's filter / sort / project / format pipeline. Returns `None`
/// when no row matches the view, which suppresses the table entirely.
fn render_view(view: &View, dataset: &[Measurement]) -> Option<String> {
    let mut subset: Vec<&Measurement> = dataset
        .iter()
        .filter(|m| m.raw.padded_element_size == view.stride)
        .collect();
    if subset.is_empty() {
        return None;
    }

    // sort_by is stable, so rows with equal keys keep their input order
    subset.sort_by(|a, b| (view.sort)(a, b));

    let labels: Vec<&str> = view.columns.iter().map(|c| c.label()).collect();
    let rows: Vec<Vec<String>> = subset
        .iter()
        .map(|m| view.columns.iter().map(|c| c.format(m)).collect())
        .collect();

    Some(render_table(view.title, &labels, &rows))
}

/// Renders a titled table: title, `=` rule, header, right-aligned data rows,
/// then a blank line. The rule spans the header row, falling back to the
/// title's width when the table renders empty.
fn render_table(title: &str, labels: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = labels.iter().map(|label| label.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header = format_row(labels, &widths);
    let rule_len = if header.is_empty() {
        title.len()
    } else {
        header.len()
    };

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(rule_len));
    out.push('\n');
    out.push_str(&header);
    out.push('\n');
    for row in rows {
        out.push_str(&format_row(row, &widths));
        out.push('\n');
    }
    out.push('\n');
    out
}

fn format_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:>width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use measurements::RawMeasurement;

    fn measurement(buffer_size: u64, stride: u64, page_size: u64, cycles: u64) -> Measurement {
        Measurement::from_raw(RawMeasurement {
            buffer_size,
            padded_element_size: stride,
            page_size,
            cycles,
            num_logical_loads: 100,
            l1d_misses: 10,
            l2_misses: 5,
            l3_misses: 1,
            tlb_misses: 0,
        })
        .unwrap()
    }

    fn rendered_buffer_sizes(table: &str) -> Vec<String> {
        table
            .lines()
            .skip(3)
            .filter(|line| !line.is_empty())
            .map(|line| line.split_whitespace().next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_cache_view_selects_only_64_byte_stride() {
        let dataset = vec![
            measurement(1024, 64, 4096, 1000),
            measurement(2048, 128, 4096, 1000),
            measurement(4096, 4096, 4096, 1000),
        ];

        let table = render_view(&CACHE_VIEW, &dataset).unwrap();
        assert_eq!(rendered_buffer_sizes(&table), vec!["1KiB"]);
    }

    #[test]
    fn test_stride_128_appears_in_neither_view() {
        let dataset = vec![measurement(2048, 128, 4096, 1000)];

        assert!(render_view(&CACHE_VIEW, &dataset).is_none());
        assert!(render_view(&TLB_VIEW, &dataset).is_none());
    }

    #[test]
    fn test_cache_view_sorts_by_buffer_size_ascending() {
        let dataset = vec![
            measurement(8192, 64, 4096, 1000),
            measurement(1024, 64, 4096, 1000),
            measurement(4096, 64, 4096, 1000),
        ];

        let table = render_view(&CACHE_VIEW, &dataset).unwrap();
        assert_eq!(rendered_buffer_sizes(&table), vec!["1KiB", "4KiB", "8KiB"]);
    }

    #[test]
    fn test_cache_view_ties_keep_input_order() {
        // Equal buffer sizes, distinguishable by latency
        let dataset = vec![
            measurement(1024, 64, 4096, 3000),
            measurement(1024, 64, 4096, 1000),
            measurement(1024, 64, 4096, 2000),
        ];

        let table = render_view(&CACHE_VIEW, &dataset).unwrap();
        let latencies: Vec<&str> = table
            .lines()
            .skip(3)
            .filter(|line| !line.is_empty())
            .map(|line| line.split_whitespace().nth(1).unwrap())
            .collect();
        assert_eq!(latencies, vec!["30.00", "10.00", "20.00"]);
    }

    #[test]
    fn test_tlb_view_sorts_buffer_ascending_then_page_descending() {
        let dataset = vec![
            measurement(1 << 20, 4096, 4096, 1000),
            measurement(1 << 20, 4096, 1 << 21, 1000),
            measurement(1 << 10, 4096, 4096, 1000),
        ];

        let table = render_view(&TLB_VIEW, &dataset).unwrap();
        let rows: Vec<(String, String)> = table
            .lines()
            .skip(3)
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut cells = line.split_whitespace();
                (
                    cells.next().unwrap().to_string(),
                    cells.next().unwrap().to_string(),
                )
            })
            .collect();

        assert_eq!(
            rows,
            vec![
                ("1KiB".to_string(), "4KiB".to_string()),
                ("1MiB".to_string(), "2MiB".to_string()),
                ("1MiB".to_string(), "4KiB".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_view_writes_nothing() {
        let dataset = vec![measurement(1024, 64, 4096, 1000)];

        let mut out = Vec::new();
        print_tlb_table(&mut out, &dataset).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_cache_table_exact_output() {
        let dataset = vec![measurement(1024, 64, 4096, 1000)];

        let mut out = Vec::new();
        print_cache_table(&mut out, &dataset).unwrap();

        let expected = "\
Cache Hierarchy Analysis (PaddedElementSize: 64 Bytes)
==============================================================================
BufferSize  Latency (cycles)  L1DMiss (%)  L2Miss (%)  L3Miss (%)  TLBMiss (%)
      1KiB             10.00        10.00        5.00        1.00         0.00

";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_tlb_table_exact_output() {
        let dataset = vec![measurement(8192, 4096, 4096, 1000)];

        let mut out = Vec::new();
        print_tlb_table(&mut out, &dataset).unwrap();

        let expected = "\
TLB Analysis (PaddedElementSize: 4096 Bytes)
=====================================================================================================
BufferSize  PageSize  PageEntries  Latency (cycles)  L1DMiss (%)  L2Miss (%)  L3Miss (%)  TLBMiss (%)
      8KiB      4KiB            2             10.00        10.00        5.00        1.00         0.00

";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_rule_falls_back_to_title_width_for_empty_table() {
        let table = render_table("Empty Analysis", &[], &[]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Empty Analysis");
        assert_eq!(lines[1], "=".repeat("Empty Analysis".len()));
    }
}
