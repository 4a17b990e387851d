//! DNA sequences over the four-base alphabet and the scalar metrics computed on them.

use crate::constants::{OMEGA, OMEGA_PERIOD};
use anyhow::{bail, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Base {
    A,
    T,
    C,
    G,
}

impl Base {
    pub const ALL: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];

    /// Numeric encoding used for spectral analysis (A=1, T=2, C=3, G=4).
    pub fn numeric(self) -> f64 {
        match self {
            Base::A => 1.0,
            Base::T => 2.0,
            Base::C => 3.0,
            Base::G => 4.0,
        }
    }

    /// Positional weight of the entropic signature: A=1, T=Ω^0.1, C=Ω^0.2, G=Ω^0.3.
    pub fn entropic_weight(self) -> f64 {
        match self {
            Base::A => 1.0,
            Base::T => OMEGA.powf(0.1),
            Base::C => OMEGA.powf(0.2),
            Base::G => OMEGA.powf(0.3),
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// A random base guaranteed to differ from `self`.
    pub fn random_other(self, rng: &mut impl Rng) -> Self {
        let others: Vec<Base> = Self::ALL.into_iter().filter(|b| *b != self).collect();
        others[rng.random_range(0..others.len())]
    }

    fn index(self) -> usize {
        match self {
            Base::A => 0,
            Base::T => 1,
            Base::C => 2,
            Base::G => 3,
        }
    }
}

impl TryFrom<char> for Base {
    type Error = anyhow::Error;

    fn try_from(value: char) -> Result<Self> {
        match value.to_ascii_uppercase() {
            'A' => Ok(Base::A),
            'T' => Ok(Base::T),
            'C' => Ok(Base::C),
            'G' => Ok(Base::G),
            other => bail!("Unknown nucleotide: {other}"),
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::C => 'C',
            Base::G => 'G',
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DnaSequence {
    bases: Vec<Base>,
}

impl DnaSequence {
    pub fn new(bases: Vec<Base>) -> Self {
        Self { bases }
    }

    pub fn random(rng: &mut impl Rng, length: usize) -> Self {
        Self::new((0..length).map(|_| Base::random(rng)).collect())
    }

    /// A sequence repeating a random pattern of `OMEGA_PERIOD` bases, where each
    /// position is independently replaced by a random base with probability `noise`.
    pub fn omega_resonant(rng: &mut impl Rng, length: usize, noise: f64) -> Self {
        let pattern: Vec<Base> = (0..OMEGA_PERIOD).map(|_| Base::random(rng)).collect();
        let bases = (0..length)
            .map(|i| {
                if rng.random::<f64>() > noise {
                    pattern[i % OMEGA_PERIOD]
                } else {
                    Base::random(rng)
                }
            })
            .collect();
        Self::new(bases)
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    pub fn bases_mut(&mut self) -> &mut [Base] {
        &mut self.bases
    }

    pub fn numeric_signal(&self) -> Vec<f64> {
        self.bases.iter().map(|b| b.numeric()).collect()
    }

    /// Shannon entropy of the base composition, in bits.
    pub fn shannon_entropy(&self) -> f64 {
        if self.bases.is_empty() {
            return 0.0;
        }
        let mut counts = [0usize; 4];
        for base in &self.bases {
            counts[base.index()] += 1;
        }
        let total = self.bases.len() as f64;
        counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                -p * p.log2()
            })
            .sum::<f64>()
            .max(0.0)
    }

    /// Sum of entropic weights scaled by sqrt(position + 1).
    pub fn entropic_signature(&self) -> f64 {
        self.bases
            .iter()
            .enumerate()
            .map(|(i, b)| b.entropic_weight() * ((i + 1) as f64).sqrt())
            .sum()
    }
}

impl FromStr for DnaSequence {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let bases = s.chars().map(Base::try_from).collect::<Result<Vec<_>>>()?;
        Ok(Self::new(bases))
    }
}

impl fmt::Display for DnaSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for base in &self.bases {
            write!(f, "{base}")?;
        }
        Ok(())
    }
}

/// Mismatches over the common prefix of both sequences.
pub fn hamming_distance(a: &DnaSequence, b: &DnaSequence) -> usize {
    a.bases
        .iter()
        .zip(b.bases.iter())
        .filter(|(x, y)| x != y)
        .count()
}

pub fn entropic_distance(a: &DnaSequence, b: &DnaSequence) -> f64 {
    (a.entropic_signature() - b.entropic_signature()).abs()
}
