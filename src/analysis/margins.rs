// Winning margin analysis: the difference between two candidates, as a
// share of the votes cast, against the turnout.

use crate::analysis::turnout::{district_turnout, province_name, province_turnout};
use crate::analysis::*;

fn margin(rec: &Record, leader_column: &str, trailer_column: &str) -> StatsResult<f64> {
    Ok(rec.quantity::<f64>(leader_column)? - rec.quantity::<f64>(trailer_column)?)
}

pub fn run_winning_margin(
    ctx: &AnalysisContext,
    election_name: &str,
    leader: &str,
    trailer: &str,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    ctx.candidate(leader)?;
    ctx.candidate(trailer)?;
    let source = &election.votes;
    let rules = source.name_rules();
    let table = ctx.load(source)?;
    let total_column = source.total_votes_column()?;
    let leader_column = source.candidate_column(leader)?;
    let trailer_column = source.candidate_column(trailer)?;

    // By province
    let margins: Aggregate<String, f64> = aggregate_with(
        &table,
        by_province(source.province_column(), &rules),
        |rec| margin(rec, leader_column, trailer_column),
        KeyPolicy::Sum,
    )?;
    let totals: Aggregate<String, f64> = aggregate(
        &table,
        by_province(source.province_column(), &rules),
        total_column,
        KeyPolicy::Sum,
    )?;
    let provinces = ctx.provinces()?;
    let wma = provinces.renumber(&share_percent(&margins, &totals)?)?;
    let turnout = provinces.renumber(&province_turnout(ctx, election)?)?;
    let pairs = pair_by_key(&turnout, &wma)?;

    let name = format!("{}_wma_by_province.csv", election.name);
    let mut by_p = OutputTable::new(
        name.as_str(),
        &[
            "number",
            "province",
            "turnout",
            "turnout_minus_50",
            "winning_margin",
        ],
    );
    for (num, t, m) in pairs.iter() {
        by_p.push(vec![
            num.to_string(),
            province_name(ctx, *num)?,
            fmt_num(*t),
            fmt_num(t - 50.0),
            fmt_num(*m),
        ]);
    }

    // By district
    let margins: Aggregate<DistrictKey, f64> = aggregate_with(
        &table,
        by_district(source.province_column(), source.district_column(), &rules),
        |rec| margin(rec, leader_column, trailer_column),
        KeyPolicy::Sum,
    )?;
    let totals: Aggregate<DistrictKey, f64> = aggregate(
        &table,
        by_district(source.province_column(), source.district_column(), &rules),
        total_column,
        KeyPolicy::Sum,
    )?;
    let wma = share_percent(&margins, &totals)?;
    let turnout = district_turnout(ctx, election)?;
    let pairs = pair_by_key(&turnout, &wma)?;

    let name = format!("{}_wma_by_district.csv", election.name);
    let mut by_d = OutputTable::new(
        name.as_str(),
        &[
            "province",
            "district",
            "turnout",
            "turnout_minus_50",
            "winning_margin",
        ],
    );
    for (k, t, m) in pairs.iter() {
        by_d.push(vec![
            k.province.clone(),
            k.district.clone(),
            fmt_num(*t),
            fmt_num(t - 50.0),
            fmt_num(*m),
        ]);
    }
    info!(
        "{}: winning margin of {} over {} in {} provinces and {} districts",
        election.name,
        leader,
        trailer,
        by_p.rows.len(),
        by_d.rows.len()
    );

    Ok(AnalysisOutput {
        tables: vec![by_p, by_d],
        summary: None,
    })
}
