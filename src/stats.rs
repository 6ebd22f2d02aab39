//! Probe-length statistics for inspecting how well keys spread out.
//!
//! Compiled for tests, or with the `stats` feature.

use alloc::vec::Vec;

use crate::SlotView;

/// Number of entries at each displacement from their home bucket.
///
/// Index `d` of [`bins`](Self::bins) counts the entries that sit `d` slots
/// past their home. The last bin is always non-zero; an empty table has no
/// bins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

impl ProbeHistogram {
    pub(crate) fn from_slots<'a, V: 'a>(slots: impl Iterator<Item = SlotView<'a, V>>) -> Self {
        let mut bins = Vec::new();
        for displacement in slots.filter_map(|slot| slot.displacement()) {
            if bins.len() <= displacement {
                bins.resize(displacement + 1, 0);
            }
            bins[displacement] += 1;
        }
        ProbeHistogram { bins }
    }

    /// Entry counts indexed by displacement.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Total number of entries counted.
    pub fn total(&self) -> usize {
        self.bins.iter().sum()
    }

    /// The largest displacement of any entry, or `None` for an empty table.
    pub fn max_displacement(&self) -> Option<usize> {
        self.bins.len().checked_sub(1)
    }

    /// Average displacement over all entries.
    pub fn mean_displacement(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self.bins.iter().enumerate().map(|(d, &n)| d * n).sum();
        weighted as f64 / total as f64
    }

    /// Pretty-prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.total());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            bar.extend(partial);
            bar
        };

        for (displacement, &count) in self.bins.iter().enumerate() {
            println!("{displacement:>3} | {} ({count})", make_bar(count));
        }
    }
}

/// Occupancy and displacement summary of a table.
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries in the table.
    pub populated: usize,
    /// Number of slots in the backing array.
    pub capacity: usize,
    /// Number of slots holding nothing.
    pub empty_slots: usize,
    /// `populated / capacity`.
    pub load_factor: f64,
    /// Largest distance of any entry from its home bucket.
    pub max_displacement: usize,
    /// Average distance of entries from their home bucket.
    pub mean_displacement: f64,
    /// Bytes occupied by the slot array.
    pub total_bytes: usize,
}

impl DebugStats {
    pub(crate) fn from_slots<'a, V: 'a>(
        slots: impl Iterator<Item = SlotView<'a, V>>,
        total_bytes: usize,
    ) -> Self {
        let mut capacity = 0;
        let histogram = ProbeHistogram::from_slots(slots.inspect(|_| capacity += 1));
        let populated = histogram.total();

        DebugStats {
            populated,
            capacity,
            empty_slots: capacity - populated,
            load_factor: if capacity == 0 {
                0.0
            } else {
                populated as f64 / capacity as f64
            },
            max_displacement: histogram.max_displacement().unwrap_or(0),
            mean_displacement: histogram.mean_displacement(),
            total_bytes,
        }
    }

    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!("Empty slots: {}", self.empty_slots);
        println!(
            "Displacement: max {}, mean {:.3}",
            self.max_displacement, self.mean_displacement
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}
