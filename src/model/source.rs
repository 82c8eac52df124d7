use crate::model::location::Location;
use crate::model::mfd::Mfd;
use crate::model::modelerror::ModelError;
use crate::model::rupture::Rupture;

/// Named collection of ruptures sharing a magnitude–frequency distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    name: String,
    ruptures: Vec<Rupture>
}

impl Source {
    pub fn new(name: impl Into<String>, ruptures: Vec<Rupture>) -> Result<Source, ModelError> {
        let name = name.into();
        if ruptures.is_empty() {
            return Err(ModelError::Empty(format!("source {name}")));
        }
        for rupture in &ruptures {
            ModelError::check_range("mag", rupture.mag(), 0.0, 10.0)?;
            ModelError::check_range("rate", rupture.rate(), 0.0, f64::INFINITY)?;
        }
        Ok(Source { name, ruptures })
    }

    /// One point rupture per MFD bin at `hypocenter`.
    pub fn point(name: impl Into<String>, hypocenter: Location, rake: f64, mfd: &Mfd) -> Result<Source, ModelError> {
        let ruptures = mfd
            .bins()
            .map(|(mag, rate)| Rupture::point(mag, rate, rake, hypocenter))
            .collect();
        Source::new(name, ruptures)
    }

    /// One full-plane rupture per MFD bin on the fault `start → end`.
    #[allow(clippy::too_many_arguments)]
    pub fn fault(
        name: impl Into<String>,
        start: Location,
        end: Location,
        dip: f64,
        width: f64,
        z_top: f64,
        rake: f64,
        mfd: &Mfd
    ) -> Result<Source, ModelError> {
        ModelError::check_range("dip", dip, 0.0, 90.0)?;
        ModelError::check_range("width", width, 0.0, 100.0)?;
        ModelError::check_range("z_top", z_top, 0.0, 700.0)?;
        let ruptures = mfd
            .bins()
            .map(|(mag, rate)| Rupture::planar(mag, rate, rake, dip, width, z_top, start, end))
            .collect();
        Source::new(name, ruptures)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ruptures(&self) -> &[Rupture] {
        &self.ruptures
    }

    pub fn total_rate(&self) -> f64 {
        self.ruptures.iter().map(Rupture::rate).sum()
    }
}
