use crate::align::{ensure_aligned, zip_with};
use crate::error::{IndicatorError, IndicatorResult};
use crate::indicator_series::IndicatorSeries;
use crate::series::Series;

/// RSI level above which a market is read as overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI level below which a market is read as oversold.
pub const RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_RSI_PERIOD: usize = 14;

fn validate(values: &[f64], name: &'static str, period: usize) -> IndicatorResult<()> {
    if values.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }

    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { name, period });
    }

    Ok(())
}

fn check_period(name: &'static str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod { name, period });
    }

    Ok(())
}

/// Smoothing factor for an EMA spanning `period` samples.
fn alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Simple Moving Average.
///
/// Position `i` holds the mean of `values[i + 1 - period ..= i]`; the first
/// `period - 1` positions are undefined. A period longer than the input yields
/// an entirely undefined series.
pub fn sma(values: &[f64], period: usize) -> IndicatorResult<IndicatorSeries> {
    validate(values, "SMA", period)?;

    let mut out = Vec::with_capacity(values.len());
    // Running sum over the finite values of the window; windows holding a
    // non-finite value are summed directly so NaN/inf surface as computed.
    let mut sum = 0.0;
    let mut non_finite = 0usize;

    for (i, &value) in values.iter().enumerate() {
        if value.is_finite() {
            sum += value;
        } else {
            non_finite += 1;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_finite() {
                sum -= leaving;
            } else {
                non_finite -= 1;
            }
        }

        if i + 1 < period {
            out.push(None);
        } else if non_finite > 0 {
            let window = &values[i + 1 - period..=i];
            out.push(Some(window.iter().sum::<f64>() / period as f64));
        } else {
            out.push(Some(sum / period as f64));
        }
    }

    Ok(IndicatorSeries::new(out))
}

fn ema_over<I>(values: I, period: usize) -> IndicatorSeries
where
    I: IntoIterator<Item = Option<f64>>,
{
    let alpha = alpha(period);
    let mut state: Option<f64> = None;

    values
        .into_iter()
        .map(|value| {
            let value = value?;
            let next = match state {
                None => value,
                Some(prev) => alpha * value + (1.0 - alpha) * prev,
            };
            state = Some(next);
            Some(next)
        })
        .collect()
}

/// Exponential Moving Average seeded with the first value.
///
/// `ema[0] = values[0]` and `ema[i] = a * values[i] + (1 - a) * ema[i - 1]`
/// with `a = 2 / (period + 1)`. Every position is defined.
pub fn ema(values: &[f64], period: usize) -> IndicatorResult<IndicatorSeries> {
    validate(values, "EMA", period)?;

    Ok(ema_over(values.iter().copied().map(Some), period))
}

/// EMA over a series that may contain undefined positions.
///
/// Smoothing starts at the first defined value. Undefined inputs stay
/// undefined in the output and the smoothing state carries across them.
pub fn ema_series(input: &IndicatorSeries, period: usize) -> IndicatorResult<IndicatorSeries> {
    if input.is_empty() {
        return Err(IndicatorError::EmptySeries);
    }
    check_period("EMA", period)?;

    Ok(ema_over(input.iter(), period))
}

/// Maps average gain/loss to RSI, including the flat and one-sided cases.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => 50.0,
        (false, true) => 100.0,
        (true, false) => 0.0,
        (false, false) => {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        }
    }
}

/// Relative Strength Index using simple rolling means of gains and losses.
///
/// The first value appears at index `period`, once `period` price changes
/// exist. A window without gains or losses yields 50; only gains yields 100;
/// only losses yields 0.
pub fn rsi(values: &[f64], period: usize) -> IndicatorResult<IndicatorSeries> {
    validate(values, "RSI", period)?;

    let n = values.len();
    let mut gains = Vec::with_capacity(n);
    let mut losses = Vec::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    out.push(None);

    // Running sums over the finite samples of the window, as in `sma`.
    // Windows holding an infinite gain or loss are averaged directly.
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut non_finite = 0usize;
    // Counting non-zero samples keeps an all-zero window exactly zero even
    // after floating-point residue from earlier samples.
    let mut gain_count = 0usize;
    let mut loss_count = 0usize;

    for i in 1..n {
        let delta = values[i] - values[i - 1];
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };
        gains.push(gain);
        losses.push(loss);

        if gain.is_finite() && loss.is_finite() {
            gain_sum += gain;
            loss_sum += loss;
        } else {
            non_finite += 1;
        }
        gain_count += usize::from(gain != 0.0);
        loss_count += usize::from(loss != 0.0);

        // gains[k] holds the delta ending at index k + 1
        if gains.len() > period {
            let old_gain = gains[gains.len() - 1 - period];
            let old_loss = losses[losses.len() - 1 - period];
            if old_gain.is_finite() && old_loss.is_finite() {
                gain_sum -= old_gain;
                loss_sum -= old_loss;
            } else {
                non_finite -= 1;
            }
            gain_count -= usize::from(old_gain != 0.0);
            loss_count -= usize::from(old_loss != 0.0);
        }

        if gains.len() < period {
            out.push(None);
            continue;
        }

        let (window_gain, window_loss) = if non_finite > 0 {
            let from = gains.len() - period;
            (
                gains[from..].iter().sum::<f64>(),
                losses[from..].iter().sum::<f64>(),
            )
        } else {
            (gain_sum, loss_sum)
        };

        let avg_gain = if gain_count == 0 {
            0.0
        } else {
            window_gain / period as f64
        };
        let avg_loss = if loss_count == 0 {
            0.0
        } else {
            window_loss / period as f64
        };

        out.push(Some(rsi_value(avg_gain, avg_loss)));
    }

    Ok(IndicatorSeries::new(out))
}

/// Fast, slow and signal spans for [`macd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

impl Macd {
    /// `true` where the histogram is non-negative, `None` where it is undefined.
    pub fn histogram_up(&self) -> Vec<Option<bool>> {
        self.histogram.iter().map(|v| v.map(|h| h >= 0.0)).collect()
    }
}

/// Moving Average Convergence Divergence.
/// - line: EMA(fast) - EMA(slow)
/// - signal: EMA(signal) of the line
/// - histogram: line - signal
pub fn macd(values: &[f64], params: MacdParams) -> IndicatorResult<Macd> {
    validate(values, "MACD fast", params.fast)?;
    check_period("MACD slow", params.slow)?;
    check_period("MACD signal", params.signal)?;

    let fast = ema(values, params.fast)?;
    let slow = ema(values, params.slow)?;
    let line = zip_with(&fast, &slow, |f, s| f - s)?;
    let signal = ema_series(&line, params.signal)?;
    let histogram = zip_with(&line, &signal, |l, s| l - s)?;

    ensure_aligned(values.len(), &[&line, &signal, &histogram])?;

    Ok(Macd {
        line,
        signal,
        histogram,
    })
}

/// Indicator calculations bound to the close prices of one [`Series`].
///
/// Every output is checked to be aligned with the series before it is handed
/// out, so callers can zip candles and indicator values by position.
pub struct Indicators<'a> {
    series: &'a Series,
    close: Vec<f64>,
}

impl<'a> Indicators<'a> {
    pub fn new(series: &'a Series) -> Self {
        Self {
            series,
            close: series.close(),
        }
    }

    fn aligned(&self, derived: IndicatorSeries) -> IndicatorResult<IndicatorSeries> {
        ensure_aligned(self.series.len(), &[&derived])?;
        Ok(derived)
    }

    pub fn sma(&self, period: usize) -> IndicatorResult<IndicatorSeries> {
        self.aligned(sma(&self.close, period)?)
    }

    pub fn ema(&self, period: usize) -> IndicatorResult<IndicatorSeries> {
        self.aligned(ema(&self.close, period)?)
    }

    pub fn rsi(&self, period: usize) -> IndicatorResult<IndicatorSeries> {
        self.aligned(rsi(&self.close, period)?)
    }

    pub fn macd(&self, params: MacdParams) -> IndicatorResult<Macd> {
        let result = macd(&self.close, params)?;
        ensure_aligned(
            self.series.len(),
            &[&result.line, &result.signal, &result.histogram],
        )?;
        Ok(result)
    }
}
