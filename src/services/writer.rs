use super::sample::{Sample, Sampler};
use crate::error::{AdError, Result};
use crate::float::Float;

/// An append-only table: one header, then rows in iteration order.
pub trait Writer<F> {
    fn write_names(&mut self, names: &[String]);
    fn write_row(&mut self, values: &[F]);
}

/// Keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter<F> {
    pub names: Vec<String>,
    pub rows: Vec<Vec<F>>,
}

impl<F> MemoryWriter<F> {
    pub fn new() -> Self {
        MemoryWriter {
            names: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<F: Copy> Writer<F> for MemoryWriter<F> {
    fn write_names(&mut self, names: &[String]) {
        self.names = names.to_vec();
    }

    fn write_row(&mut self, values: &[F]) {
        self.rows.push(values.to_vec());
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullWriter;

impl<F> Writer<F> for NullWriter {
    fn write_names(&mut self, _names: &[String]) {}
    fn write_row(&mut self, _values: &[F]) {}
}

/// Routes chain states to the sample and diagnostic streams.
///
/// Each stream's column schema is fixed by the first `write_*_names` call (or
/// by the first row if no names were written); later rows of another width
/// are refused.
pub struct McmcWriter<W, D> {
    sample: W,
    diagnostic: D,
    sample_width: Option<usize>,
    diagnostic_width: Option<usize>,
}

const FIXED_COLUMNS: [&str; 2] = ["lp__", "accept_stat__"];

fn check_width(op: &'static str, bound: &mut Option<usize>, got: usize) -> Result<()> {
    match *bound {
        Some(width) if width != got => Err(AdError::SizeMismatch {
            op,
            lhs_name: "row width",
            lhs: got,
            rhs_name: "bound columns",
            rhs: width,
        }),
        Some(_) => Ok(()),
        None => {
            *bound = Some(got);
            Ok(())
        }
    }
}

impl<W, D> McmcWriter<W, D> {
    pub fn new(sample: W, diagnostic: D) -> Self {
        McmcWriter {
            sample,
            diagnostic,
            sample_width: None,
            diagnostic_width: None,
        }
    }

    pub fn sample_writer(&self) -> &W {
        &self.sample
    }

    pub fn diagnostic_writer(&self) -> &D {
        &self.diagnostic
    }

    pub fn into_inner(self) -> (W, D) {
        (self.sample, self.diagnostic)
    }

    fn sample_names<F: Float, S: Sampler<F> + ?Sized>(
        sampler: &S,
        param_names: &[String],
    ) -> Vec<String> {
        FIXED_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .chain(sampler.sampler_param_names())
            .chain(param_names.iter().cloned())
            .collect()
    }

    fn sample_row<F: Float, S: Sampler<F> + ?Sized>(sample: &Sample<F>, sampler: &S) -> Vec<F> {
        let mut row = vec![sample.log_prob, sample.accept_stat];
        row.extend(sampler.sampler_params());
        row.extend_from_slice(&sample.params);
        row
    }

    /// Bind the sample schema: `lp__, accept_stat__, <sampler>, <params>`.
    pub fn write_sample_names<F: Float, S: Sampler<F> + ?Sized>(
        &mut self,
        sampler: &S,
        param_names: &[String],
    ) -> Result<()>
    where
        W: Writer<F>,
    {
        let names = Self::sample_names(sampler, param_names);
        check_width("write_sample_names", &mut self.sample_width, names.len())?;
        self.sample.write_names(&names);
        Ok(())
    }

    /// Bind the diagnostic schema: the sample columns followed by one
    /// `g_<param>` column per parameter if the sampler reports gradients.
    pub fn write_diagnostic_names<F: Float, S: Sampler<F> + ?Sized>(
        &mut self,
        sampler: &S,
        param_names: &[String],
    ) -> Result<()>
    where
        D: Writer<F>,
    {
        let mut names = Self::sample_names(sampler, param_names);
        if sampler.reports_gradient() {
            names.extend(param_names.iter().map(|n| format!("g_{n}")));
        }
        check_width(
            "write_diagnostic_names",
            &mut self.diagnostic_width,
            names.len(),
        )?;
        self.diagnostic.write_names(&names);
        Ok(())
    }

    pub fn write_sample_params<F: Float, S: Sampler<F> + ?Sized>(
        &mut self,
        sample: &Sample<F>,
        sampler: &S,
    ) -> Result<()>
    where
        W: Writer<F>,
    {
        let row = Self::sample_row(sample, sampler);
        check_width("write_sample_params", &mut self.sample_width, row.len())?;
        self.sample.write_row(&row);
        Ok(())
    }

    pub fn write_diagnostic_params<F: Float, S: Sampler<F> + ?Sized>(
        &mut self,
        sample: &Sample<F>,
        sampler: &S,
    ) -> Result<()>
    where
        D: Writer<F>,
    {
        let mut row = Self::sample_row(sample, sampler);
        if let Some(gradient) = sampler.gradient() {
            row.extend(gradient);
        }
        check_width(
            "write_diagnostic_params",
            &mut self.diagnostic_width,
            row.len(),
        )?;
        self.diagnostic.write_row(&row);
        Ok(())
    }
}
