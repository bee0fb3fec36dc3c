//! Size units
//!
//! Sizes travel through the reporter in KiB, as reported by the catalog.

pub const KIB_PER_MIB: f64 = 1024.0;
pub const KIB_PER_GIB: f64 = 1024.0 * 1024.0;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a KiB size with the most readable unit
///
/// >= 1 GiB as GiB, >= 1 MiB as MiB, below 1 KiB as bytes, otherwise KiB.
pub fn format_size_with_unit(size_kib: f64) -> String {
    let size = if size_kib.is_finite() { size_kib } else { 0.0 };

    if size >= KIB_PER_GIB {
        format!("{:.2} GiB", size / KIB_PER_GIB)
    } else if size >= KIB_PER_MIB {
        format!("{:.2} MiB", size / KIB_PER_MIB)
    } else if size < 1.0 {
        format!("{:.2} B", size * 1024.0)
    } else {
        format!("{:.2} KiB", size)
    }
}

/// A KiB size expressed in KiB, MiB and GiB, each to two decimals
#[derive(Debug, Clone, PartialEq)]
pub struct SizeBreakdown {
    pub kib: String,
    pub mib: String,
    pub gib: String,
}

impl SizeBreakdown {
    pub fn from_kib(size_kib: f64) -> Self {
        Self {
            kib: format!("{:.2}", size_kib),
            mib: format!("{:.2}", size_kib / KIB_PER_MIB),
            gib: format!("{:.2}", size_kib / KIB_PER_GIB),
        }
    }
}

impl std::fmt::Display for SizeBreakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} KiB ({} MiB / {} GiB)", self.kib, self.mib, self.gib)
    }
}
