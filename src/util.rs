/// Arithmetic mean, `None` for an empty input
pub fn mean<I>(data: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = data
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Mean floored to a whole number; an empty input reports 0 rather than NaN
pub fn floored_mean<I>(data: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    mean(data).map(f64::floor).unwrap_or(0.0)
}
