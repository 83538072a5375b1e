//! Special functions needed for the chi-square p-value.
//!
//! `ln_gamma` uses the Lanczos approximation (g = 7, 9 coefficients), the
//! regularized incomplete gamma functions use the series expansion below
//! `a + 1` and Lentz's continued fraction above, as in Numerical Recipes.

use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 1000;
const EPSILON: f64 = 1e-14;
const FP_MIN: f64 = 1e-300;

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// natural logarithm of the gamma function, `x > 0`
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // reflection formula
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS[0], |acc, (i, c)| acc + c / (x + i as f64));

    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// regularized upper incomplete gamma function `Q(a, x)`
pub fn gamma_q(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    let q = if x < a + 1.0 {
        1.0 - lower_series(a, x)
    } else {
        upper_continued_fraction(a, x)
    };

    q.clamp(0.0, 1.0)
}

/// upper tail probability of the chi-square distribution
pub fn chi_square_upper_tail(statistic: f64, degrees_of_freedom: usize) -> f64 {
    if degrees_of_freedom == 0 {
        return 1.0;
    }
    gamma_q(degrees_of_freedom as f64 / 2.0, statistic / 2.0)
}

fn lower_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut del = 1.0 / a;
    let mut sum = del;
    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        del *= x / ap;
        sum += del;
        if del.abs() < sum.abs() * EPSILON {
            break;
        }
    }

    (sum.ln() - x + a * x.ln() - ln_gamma(a)).exp()
}

fn upper_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FP_MIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FP_MIN {
            d = FP_MIN;
        }
        c = b + an / c;
        if c.abs() < FP_MIN {
            c = FP_MIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPSILON {
            break;
        }
    }

    (-x + a * x.ln() - ln_gamma(a)).exp() * h
}
