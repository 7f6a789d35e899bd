use std::fmt;

/// Read-only summary of a world for display and inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldSummary {
    pub name: String,
    pub city_count: usize,
    pub total_population: u64,
    pub regions: Vec<RegionRow>,
}

/// One region line of a [`WorldSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRow {
    pub name: String,
    pub city_count: usize,
    /// Population of the region's resolvable cities.
    pub population: u64,
    pub resources: Vec<String>,
}

impl fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "World: {} regions={} cities={} population={}",
            self.name,
            self.regions.len(),
            self.city_count,
            self.total_population
        )?;
        for row in &self.regions {
            writeln!(f, "  {row}")?;
        }
        Ok(())
    }
}

impl fmt::Display for RegionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} cities={} population={} resources=[{}]",
            self.name,
            self.city_count,
            self.population,
            self.resources.join(", ")
        )
    }
}
