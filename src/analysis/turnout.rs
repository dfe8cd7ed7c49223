// Turnout by district and by province, and the helpers shared by the
// other analyses.

use crate::analysis::*;

/// Sums a column of a data source by district.
pub fn district_sum(
    ctx: &AnalysisContext,
    source: &FileSource,
    column: &str,
) -> AnalysisResult<Aggregate<DistrictKey, f64>> {
    let table = ctx.load(source)?;
    let rules = source.name_rules();
    let agg = aggregate(
        &table,
        by_district(source.province_column(), source.district_column(), &rules),
        column,
        KeyPolicy::Sum,
    )?;
    Ok(agg)
}

/// Sums a column of a data source by province.
pub fn province_sum(
    ctx: &AnalysisContext,
    source: &FileSource,
    column: &str,
) -> AnalysisResult<Aggregate<String, f64>> {
    let table = ctx.load(source)?;
    let rules = source.name_rules();
    let agg = aggregate(
        &table,
        by_province(source.province_column(), &rules),
        column,
        KeyPolicy::Sum,
    )?;
    Ok(agg)
}

pub fn district_votes(
    ctx: &AnalysisContext,
    election: &ElectionSources,
) -> AnalysisResult<Aggregate<DistrictKey, f64>> {
    district_sum(ctx, &election.votes, election.votes.total_votes_column()?)
}

pub fn province_votes(
    ctx: &AnalysisContext,
    election: &ElectionSources,
) -> AnalysisResult<Aggregate<String, f64>> {
    province_sum(ctx, &election.votes, election.votes.total_votes_column()?)
}

/// Votes cast over the voting-eligible population, in percent.
pub fn district_turnout(
    ctx: &AnalysisContext,
    election: &ElectionSources,
) -> AnalysisResult<Aggregate<DistrictKey, f64>> {
    let votes = district_votes(ctx, election)?;
    let turnout = ratio_percent(&votes, ctx.district_population()?, ctx.voting_fraction())?;
    debug!(
        "district_turnout: {}: {} districts",
        election.name,
        turnout.len()
    );
    Ok(turnout)
}

pub fn province_turnout(
    ctx: &AnalysisContext,
    election: &ElectionSources,
) -> AnalysisResult<Aggregate<String, f64>> {
    let votes = province_votes(ctx, election)?;
    let turnout = ratio_percent(&votes, ctx.province_population()?, ctx.voting_fraction())?;
    Ok(turnout)
}

pub fn run_provinces(ctx: &AnalysisContext) -> AnalysisResult<AnalysisOutput> {
    let provinces = ctx.provinces()?;
    let mut t = OutputTable::new("num_to_province.csv", &["number", "province"]);
    for (num, name) in provinces.iter() {
        t.push(vec![num.to_string(), name.to_string()]);
    }
    info!("{} provinces", provinces.len());
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: None,
    })
}

pub fn run_turnout(
    ctx: &AnalysisContext,
    election_name: &str,
    level: &str,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    let name = format!("{}_turnout_by_{}.csv", election.name, level);
    let t = match level {
        "district" => {
            let turnout = district_turnout(ctx, election)?;
            let mut t = OutputTable::new(name.as_str(), &["province", "district", "turnout"]);
            for (k, v) in turnout.iter() {
                t.push(vec![k.province.clone(), k.district.clone(), fmt_num(v)]);
            }
            t
        }
        "province" => {
            let turnout = ctx.provinces()?.renumber(&province_turnout(ctx, election)?)?;
            let mut t = OutputTable::new(name.as_str(), &["number", "province", "turnout"]);
            for (num, v) in turnout.iter() {
                t.push(vec![num.to_string(), province_name(ctx, *num)?, fmt_num(v)]);
            }
            t
        }
        x => whatever!("Unknown level {}, expected district or province", x),
    };
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: None,
    })
}

/// Histogram of the district turnouts.
pub fn run_turnout_distribution(
    ctx: &AnalysisContext,
    election_name: &str,
    bins: usize,
    max: Option<f64>,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    let turnout = district_turnout(ctx, election)?;
    let values: Vec<f64> = turnout.values().collect();
    let upper = match max {
        Some(m) => m,
        None => values.iter().cloned().fold(0.0, f64::max),
    };
    let hist = Histogram::build(&values, bins, 0.0, upper)?;
    if hist.above > 0 {
        warn!(
            "{}: {} districts with a turnout above {}",
            election.name, hist.above, upper
        );
    }

    let name = format!("{}_turnout_distribution.csv", election.name);
    let mut t = OutputTable::new(name.as_str(), &["lower", "upper", "count"]);
    for (idx, count) in hist.counts.iter().enumerate() {
        let (lo, hi) = hist.edges(idx);
        t.push(vec![fmt_num(lo), fmt_num(hi), count.to_string()]);
    }
    t.push(vec!["-inf".to_string(), fmt_num(hist.lower), hist.below.to_string()]);
    t.push(vec![fmt_num(hist.upper), "inf".to_string(), hist.above.to_string()]);
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: None,
    })
}

pub fn province_name(ctx: &AnalysisContext, num: usize) -> AnalysisResult<String> {
    match ctx.provinces()?.name_of(num) {
        Some(s) => Ok(s.to_string()),
        None => whatever!("No province with number {}", num),
    }
}
