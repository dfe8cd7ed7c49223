// Polling stations and districts with implausible numbers.

use crate::analysis::turnout::{district_turnout, district_votes};
use crate::analysis::*;

/// One candidate got nothing and the other one got the whole ballot cap.
fn is_suspicious(leader: f64, trailer: f64, cap: f64) -> bool {
    (leader == 0.0 && trailer == cap) || (trailer == 0.0 && leader == cap)
}

pub fn run_suspicious_stations(
    ctx: &AnalysisContext,
    election_name: &str,
    leader: &str,
    trailer: &str,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    ctx.candidate(leader)?;
    ctx.candidate(trailer)?;
    let cap = ctx.suspicious_ballot_cap();
    let threshold = ctx.high_turnout_percent();

    let source = election.stations();
    let table = ctx.load(source)?;
    let rules = source.name_rules();
    let leader_column = source.candidate_column(leader)?;
    let trailer_column = source.candidate_column(trailer)?;
    let flagged: Aggregate<DistrictKey, u64> = aggregate_with(
        &table,
        by_district(source.province_column(), source.district_column(), &rules),
        |rec| {
            let l: f64 = rec.quantity(leader_column)?;
            let t: f64 = rec.quantity(trailer_column)?;
            Ok(if is_suspicious(l, t, cap) { 1 } else { 0 })
        },
        KeyPolicy::Sum,
    )?;
    let mut flagged: Vec<(&DistrictKey, u64)> = flagged.iter().filter(|(_, c)| *c > 0).collect();
    flagged.sort_by(|a, b| b.1.cmp(&a.1));
    let total_flagged: u64 = flagged.iter().map(|(_, c)| c).sum();
    if total_flagged > 0 {
        warn!(
            "{}: {} polling stations with {} votes for one candidate and none for the other",
            election.name, total_flagged, cap
        );
    }

    let name = format!("{}_suspicious_stations.csv", election.name);
    let mut s = OutputTable::new(name.as_str(), &["province", "district", "flagged_stations"]);
    for (k, c) in flagged.iter() {
        s.push(vec![k.province.clone(), k.district.clone(), c.to_string()]);
    }

    let turnout = district_turnout(ctx, election)?;
    let votes = district_votes(ctx, election)?;
    let population = ctx.district_population()?;
    let mut high: Vec<(&DistrictKey, f64)> = turnout.iter().filter(|(_, t)| *t > threshold).collect();
    high.sort_by(|a, b| b.1.total_cmp(&a.1));

    let name = format!("{}_high_turnout_districts.csv", election.name);
    let mut h = OutputTable::new(
        name.as_str(),
        &["province", "district", "votes", "population", "turnout"],
    );
    for (k, t) in high.iter() {
        h.push(vec![
            k.province.clone(),
            k.district.clone(),
            fmt_num(votes.get(k).unwrap_or(0.0)),
            population.get(k).unwrap_or(0).to_string(),
            fmt_num(*t),
        ]);
    }
    info!(
        "{}: {} districts with flagged stations, {} districts above {}% turnout",
        election.name,
        s.rows.len(),
        h.rows.len(),
        threshold
    );
    Ok(AnalysisOutput {
        tables: vec![s, h],
        summary: None,
    })
}
