use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub expanded_nodes: usize,
    pub generated_nodes: usize,
    pub relaxed_cells: usize,
    pub elapsed_us: u128,
}

impl Stats {
    pub(crate) fn print(&self, query: &str) {
        info!(
            "{query}: time(microseconds) {:?} expanded nodes {:?} generated nodes {:?} relaxed cells {:?}",
            self.elapsed_us, self.expanded_nodes, self.generated_nodes, self.relaxed_cells
        );
    }
}
