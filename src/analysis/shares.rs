use crate::analysis::*;

/// Histogram of the vote share of a candidate over the polling stations of
/// one province.
pub fn run_vote_share_distribution(
    ctx: &AnalysisContext,
    election_name: &str,
    candidate_name: &str,
    province: &str,
    bins: usize,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    let candidate = ctx.candidate(candidate_name)?;
    let source = election.stations();
    let table = ctx.load(source)?;
    let rules = source.name_rules();
    let province_column = source.province_column();
    let candidate_column = source.candidate_column(candidate_name)?;
    let total_column = source.total_votes_column()?;

    let wanted = province.to_lowercase();
    let mut shares: Vec<f64> = Vec::new();
    for rec in table.records() {
        if rules.apply(rec.get(province_column)?).to_lowercase() != wanted {
            continue;
        }
        let votes: f64 = rec.quantity(candidate_column)?;
        let total: f64 = rec.quantity(total_column)?;
        let key = format!("{}:{}", table.source(), rec.lineno());
        shares.push(percent(votes, total, &key)?);
    }
    if shares.is_empty() {
        return Err(StatsError::UnknownProvince {
            name: province.to_string(),
        }
        .into());
    }
    info!(
        "{}: {} polling stations in {}",
        election.name,
        shares.len(),
        province
    );

    let hist = Histogram::build(&shares, bins, 0.0, 100.0)?;
    let name = format!(
        "{}_{}_distrib.csv",
        candidate.name.to_lowercase(),
        wanted
    );
    let mut t = OutputTable::new(name.as_str(), &["lower", "upper", "count"]);
    for (idx, count) in hist.counts.iter().enumerate() {
        let (lo, hi) = hist.edges(idx);
        t.push(vec![fmt_num(lo), fmt_num(hi), count.to_string()]);
    }
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: None,
    })
}
