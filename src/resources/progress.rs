/// Download progress of one model asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadProgress {
    pub asset: String,
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    fn ratio(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.loaded as f64 / total as f64),
            _ => None,
        }
    }

    /// Whole percent, `None` while the size is unknown.
    pub fn percent(&self) -> Option<u32> {
        self.ratio().map(|r| (r * 100.0) as u32)
    }

    /// Percent rounded down to a multiple of five, for stepped progress bars.
    pub fn percent_by_5(&self) -> Option<u32> {
        self.ratio().map(|r| (r * 20.0) as u32 * 5)
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.loaded >= total)
    }
}
