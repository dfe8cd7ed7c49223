// Change of turnout between two elections against the change of the
// deployment of observers, by province.

use std::collections::BTreeMap;

use crate::analysis::turnout::{province_name, province_sum, province_turnout};
use crate::analysis::*;

fn observer_z_scores(
    ctx: &AnalysisContext,
    election: &ElectionSources,
) -> AnalysisResult<Aggregate<String, f64>> {
    let source = election.observers()?;
    let observers = province_sum(ctx, source, source.observers_column()?)?;
    debug!(
        "observer_z_scores: {}: {} provinces",
        election.name,
        observers.len()
    );
    Ok(z_scores(&observers)?)
}

pub fn run_observer_trends(
    ctx: &AnalysisContext,
    before_name: &str,
    after_name: &str,
) -> AnalysisResult<AnalysisOutput> {
    let before = ctx.election(before_name)?;
    let after = ctx.election(after_name)?;
    // Fail on the configuration before reading any votes.
    before.observers()?;
    after.observers()?;

    let z_before = observer_z_scores(ctx, before)?;
    let z_after = observer_z_scores(ctx, after)?;
    let z_pairs = pair_by_key(&z_before, &z_after)?;
    let z_change: Aggregate<String, f64> = Aggregate::from_map(
        z_pairs
            .iter()
            .map(|(k, b, a)| (k.clone(), a - b))
            .collect::<BTreeMap<String, f64>>(),
    );

    let turnout_change = percent_change(
        &province_turnout(ctx, before)?,
        &province_turnout(ctx, after)?,
    )?;
    check_same_keys(&turnout_change, &z_change)?;

    let provinces = ctx.provinces()?;
    let z_before = provinces.renumber(&z_before)?;
    let z_after = provinces.renumber(&z_after)?;
    let z_change = provinces.renumber(&z_change)?;
    let turnout_change = provinces.renumber(&turnout_change)?;

    let mut t = OutputTable::new(
        "observer_turnout_change.csv",
        &[
            "number",
            "province",
            "turnout_change",
            "observer_z_before",
            "observer_z_after",
            "observer_z_change",
        ],
    );
    let mut points: Vec<(f64, f64)> = Vec::new();
    for (num, dz) in z_change.iter() {
        let dt = turnout_change.get(num).unwrap_or(0.0);
        t.push(vec![
            num.to_string(),
            province_name(ctx, *num)?,
            fmt_num(dt),
            fmt_num(z_before.get(num).unwrap_or(0.0)),
            fmt_num(z_after.get(num).unwrap_or(0.0)),
            fmt_num(dz),
        ]);
        points.push((dz, dt));
    }

    let fit = linear_fit(&points)?;
    info!(
        "Observers from {} to {}: correlation {} over {} provinces",
        before.name,
        after.name,
        fit.r,
        points.len()
    );
    let summary = json!({
        "before": before.name,
        "after": after.name,
        "points": points.len(),
        "slope": fit.slope,
        "intercept": fit.intercept,
        "r": fit.r,
        "rSquared": fit.r_squared,
    });
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: Some(("observer_turnout_change.json".to_string(), summary)),
    })
}
