// Linear fits of a per-district candidate quantity against the turnout.

use crate::analysis::turnout::{district_sum, district_turnout, district_votes};
use crate::analysis::*;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FitKind {
    /// Votes for the candidate over the voting-eligible population.
    VOverE,
    /// Votes for the candidate over the votes cast.
    VoteShare,
}

impl FitKind {
    fn quantity(&self) -> &'static str {
        match self {
            FitKind::VOverE => "v_over_e",
            FitKind::VoteShare => "vote_share",
        }
    }
}

pub fn run_fit(
    ctx: &AnalysisContext,
    election_name: &str,
    candidate_name: &str,
    kind: FitKind,
) -> AnalysisResult<AnalysisOutput> {
    let election = ctx.election(election_name)?;
    let candidate = ctx.candidate(candidate_name)?;
    let source = &election.votes;
    let cand_votes = district_sum(ctx, source, source.candidate_column(candidate_name)?)?;

    let ys: Aggregate<DistrictKey, f64> = match kind {
        FitKind::VOverE => ratio_percent(
            &cand_votes,
            ctx.district_population()?,
            ctx.voting_fraction(),
        )?,
        FitKind::VoteShare => share_percent(&cand_votes, &district_votes(ctx, election)?)?,
    };
    let turnout = district_turnout(ctx, election)?;
    let pairs = pair_by_key(&turnout, &ys)?;
    let points: Vec<(f64, f64)> = pairs.iter().map(|(_, x, y)| (*x, *y)).collect();
    let fit = linear_fit(&points)?;

    let base_name = format!(
        "{}_{}_{}_vs_t",
        election.name,
        candidate.name.to_lowercase(),
        kind.quantity()
    );
    let mut t = OutputTable::new(
        format!("{}.csv", base_name).as_str(),
        &[
            "province",
            "district",
            "turnout",
            kind.quantity(),
            "fitted",
            "residual",
        ],
    );
    for ((k, x, y), residual) in pairs.iter().zip(fit.residuals.iter()) {
        t.push(vec![
            k.province.clone(),
            k.district.clone(),
            fmt_num(*x),
            fmt_num(*y),
            fmt_num(fit.predict(*x)),
            fmt_num(*residual),
        ]);
    }

    let summary = json!({
        "election": election.name,
        "candidate": candidate.name,
        "color": candidate.color,
        "quantity": kind.quantity(),
        "points": points.len(),
        "slope": fit.slope,
        "intercept": fit.intercept,
        "r": fit.r,
        "rSquared": fit.r_squared,
    });
    info!(
        "{}: {} against turnout for {}: slope {} r {}",
        election.name,
        kind.quantity(),
        candidate.name,
        fit.slope,
        fit.r
    );
    Ok(AnalysisOutput {
        tables: vec![t],
        summary: Some((format!("{}.json", base_name), summary)),
    })
}
