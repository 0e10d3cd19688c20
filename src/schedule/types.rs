//! Schedule representation and variable selectors.

use std::fmt;
use std::str::FromStr;

use crate::error::TuneError;

/// Smallest population size the solver accepts for a bin.
pub const MIN_PSIZE: u32 = 8;

/// One of the three per-bin vectors of a [`Schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Variable {
    /// Bin durations (`dT`).
    DeltaT,
    /// Bin amplitudes (`A`), in (0, 1].
    Amplitude,
    /// Bin population sizes (`psize`).
    PopulationSize,
}

impl Variable {
    pub const ALL: [Variable; 3] = [
        Variable::DeltaT,
        Variable::Amplitude,
        Variable::PopulationSize,
    ];

    /// Short name used on the command line and in checkpoint file names.
    pub fn label(&self) -> &'static str {
        match self {
            Variable::DeltaT => "dT",
            Variable::Amplitude => "A",
            Variable::PopulationSize => "psize",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variable {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dT" => Ok(Variable::DeltaT),
            "A" => Ok(Variable::Amplitude),
            "psize" => Ok(Variable::PopulationSize),
            other => Err(TuneError::UnknownVariable(other.to_string())),
        }
    }
}

/// What a tuning run optimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    /// A single vector, the other two held fixed.
    Single(Variable),
    /// `A` and `dT` alternately, with bin branching when the search stalls.
    Alternating,
    /// All three vectors at once (simulated annealing only).
    Joint,
}

impl Target {
    /// Short name used in checkpoint file names.
    pub fn label(&self) -> &'static str {
        match self {
            Target::Single(v) => v.label(),
            Target::Alternating => "both",
            Target::Joint => "joint",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Target {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "both" => Ok(Target::Alternating),
            "joint" => Ok(Target::Joint),
            other => other.parse().map(Target::Single),
        }
    }
}

/// A lookup table of `(dT, A, psize)` triples, one per bin.
///
/// The three vectors are public so callers can build schedules freely;
/// [`Schedule::validate`] is what guards the shared-length invariant and
/// it runs before every fitness evaluation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    /// Duration of each bin, each > 0.
    pub dt: Vec<f64>,
    /// Amplitude of each bin, each in (0, 1].
    pub amplitude: Vec<f64>,
    /// Population size of each bin, each >= [`MIN_PSIZE`].
    pub psize: Vec<u32>,
}

impl Schedule {
    /// Builds a schedule, rejecting vectors of unequal length.
    pub fn new(dt: Vec<f64>, amplitude: Vec<f64>, psize: Vec<u32>) -> Result<Self, TuneError> {
        let schedule = Self {
            dt,
            amplitude,
            psize,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Builds a schedule with `bins` identical bins.
    pub fn uniform(bins: usize, dt: f64, amplitude: f64, psize: u32) -> Self {
        Self {
            dt: vec![dt; bins],
            amplitude: vec![amplitude; bins],
            psize: vec![psize; bins],
        }
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.dt.len()
    }

    /// Checks that `dT`, `A` and `psize` share one length.
    pub fn validate(&self) -> Result<(), TuneError> {
        let (dt, amplitude, psize) = (self.dt.len(), self.amplitude.len(), self.psize.len());
        if dt != amplitude || psize != dt {
            return Err(TuneError::Validation {
                dt,
                amplitude,
                psize,
            });
        }
        Ok(())
    }

    /// Checks that every `dT` is positive, every `A` lies in (0, 1] and
    /// every `psize` is at least [`MIN_PSIZE`]. NaN fails every check.
    pub fn check_domain(&self) -> Result<(), TuneError> {
        let out_of_domain = |variable: Variable, index: usize, value: f64| {
            TuneError::OutOfDomain {
                variable: variable.label(),
                index,
                value,
            }
        };
        if let Some((i, &dt)) = self
            .dt
            .iter()
            .enumerate()
            .find(|(_, &d)| !(d > 0.0 && d.is_finite()))
        {
            return Err(out_of_domain(Variable::DeltaT, i, dt));
        }
        if let Some((i, &a)) = self
            .amplitude
            .iter()
            .enumerate()
            .find(|(_, &a)| !(a > 0.0 && a <= 1.0))
        {
            return Err(out_of_domain(Variable::Amplitude, i, a));
        }
        if let Some((i, &p)) = self.psize.iter().enumerate().find(|(_, &p)| p < MIN_PSIZE) {
            return Err(out_of_domain(Variable::PopulationSize, i, f64::from(p)));
        }
        Ok(())
    }

    /// Copy of one vector as floats.
    pub fn values(&self, variable: Variable) -> Vec<f64> {
        match variable {
            Variable::DeltaT => self.dt.clone(),
            Variable::Amplitude => self.amplitude.clone(),
            Variable::PopulationSize => self.psize.iter().map(|&p| p as f64).collect(),
        }
    }

    /// Writes one coordinate. Population sizes are rounded to the nearest
    /// integer and floored at [`MIN_PSIZE`].
    pub fn set(&mut self, variable: Variable, index: usize, value: f64) {
        match variable {
            Variable::DeltaT => self.dt[index] = value,
            Variable::Amplitude => self.amplitude[index] = value,
            Variable::PopulationSize => self.psize[index] = round_psize(value),
        }
    }

    /// Copy of this schedule with one coordinate replaced.
    pub fn with_value(&self, variable: Variable, index: usize, value: f64) -> Schedule {
        let mut next = self.clone();
        next.set(variable, index, value);
        next
    }

    /// Copy of this schedule with a whole vector replaced.
    pub fn with_values(&self, variable: Variable, values: &[f64]) -> Schedule {
        let mut next = self.clone();
        match variable {
            Variable::DeltaT => next.dt = values.to_vec(),
            Variable::Amplitude => next.amplitude = values.to_vec(),
            Variable::PopulationSize => {
                next.psize = values.iter().map(|&v| round_psize(v)).collect()
            }
        }
        next
    }

    /// Cumulative bin boundaries: `[0, dT[0], dT[0] + dT[1], ...]`.
    pub fn edges(&self) -> Vec<f64> {
        let mut edges = Vec::with_capacity(self.bins() + 1);
        let mut t = 0.0;
        edges.push(t);
        for &dt in &self.dt {
            t += dt;
            edges.push(t);
        }
        edges
    }

    /// Moves the boundary between bin `bin` and bin `bin + 1` to `position`,
    /// leaving every other boundary (and so the total time) unchanged.
    pub fn with_shifted_edge(&self, bin: usize, position: f64) -> Schedule {
        let edges = self.edges();
        let mut next = self.clone();
        next.dt[bin] = position - edges[bin];
        next.dt[bin + 1] = edges[bin + 2] - position;
        next
    }

    /// Sum of all bin durations.
    pub fn total_time(&self) -> f64 {
        self.dt.iter().sum()
    }

    /// Centre of every bin on the cumulative time axis.
    pub fn bin_midpoints(&self) -> Vec<f64> {
        let mut t = 0.0;
        self.dt
            .iter()
            .map(|&dt| {
                let mid = t + dt / 2.0;
                t += dt;
                mid
            })
            .collect()
    }
}

pub(crate) fn round_psize(value: f64) -> u32 {
    value.round().max(MIN_PSIZE as f64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_domain() {
        assert!(Schedule::uniform(3, 1.0, 1.0, MIN_PSIZE).check_domain().is_ok());

        let mut negative_dt = Schedule::uniform(3, 1.0, 0.5, 16);
        negative_dt.dt[1] = -2.0;
        assert!(matches!(
            negative_dt.check_domain(),
            Err(TuneError::OutOfDomain { variable: "dT", index: 1, .. })
        ));

        let mut nan_amplitude = Schedule::uniform(2, 1.0, 0.5, 16);
        nan_amplitude.amplitude[0] = f64::NAN;
        assert!(matches!(
            nan_amplitude.check_domain(),
            Err(TuneError::OutOfDomain { variable: "A", index: 0, .. })
        ));

        let mut zero_amplitude = Schedule::uniform(2, 1.0, 0.5, 16);
        zero_amplitude.amplitude[1] = 0.0;
        assert!(zero_amplitude.check_domain().is_err());

        let mut small_psize = Schedule::uniform(2, 1.0, 0.5, 16);
        small_psize.psize[1] = 4;
        assert!(matches!(
            small_psize.check_domain(),
            Err(TuneError::OutOfDomain { variable: "psize", index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let result = Schedule::new(vec![1.0, 1.0], vec![0.5], vec![16, 16]);
        match result {
            Err(TuneError::Validation {
                dt,
                amplitude,
                psize,
            }) => {
                assert_eq!((dt, amplitude, psize), (2, 1, 2));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let mut schedule = Schedule::uniform(3, 1.0, 0.5, 16);
        assert!(schedule.validate().is_ok());
        schedule.psize.pop();
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_set_rounds_and_floors_psize() {
        let mut schedule = Schedule::uniform(2, 1.0, 0.5, 16);
        schedule.set(Variable::PopulationSize, 0, 20.6);
        schedule.set(Variable::PopulationSize, 1, 3.0);
        assert_eq!(schedule.psize, vec![21, MIN_PSIZE]);
    }

    #[test]
    fn test_edges_and_midpoints() {
        let schedule = Schedule::new(vec![1.0, 2.0, 3.0], vec![0.5; 3], vec![16; 3]).unwrap();
        assert_eq!(schedule.edges(), vec![0.0, 1.0, 3.0, 6.0]);
        assert_eq!(schedule.bin_midpoints(), vec![0.5, 2.0, 4.5]);
        assert!((schedule.total_time() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_edge_preserves_total_time() {
        let schedule = Schedule::new(vec![1.0, 2.0, 3.0], vec![0.5; 3], vec![16; 3]).unwrap();
        let shifted = schedule.with_shifted_edge(1, 4.0);
        assert_eq!(shifted.dt, vec![1.0, 3.0, 2.0]);
        assert!((shifted.total_time() - schedule.total_time()).abs() < 1e-12);
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("A".parse::<Target>().unwrap(), Target::Single(Variable::Amplitude));
        assert_eq!("dT".parse::<Target>().unwrap(), Target::Single(Variable::DeltaT));
        assert_eq!(
            "psize".parse::<Target>().unwrap(),
            Target::Single(Variable::PopulationSize)
        );
        assert_eq!("all".parse::<Target>().unwrap(), Target::Alternating);
        assert_eq!("both".parse::<Target>().unwrap(), Target::Alternating);
        assert_eq!("joint".parse::<Target>().unwrap(), Target::Joint);
        assert!(matches!(
            "dt".parse::<Target>(),
            Err(TuneError::UnknownVariable(ref s)) if s == "dt"
        ));
    }
}
