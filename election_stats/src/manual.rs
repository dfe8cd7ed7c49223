/*!

This is the long-form manual for `election_stats` and `afghanstats`.

## Data sources

Every table is described by a data source in the configuration file:

```json
{
  "provider": "csv",
  "filePath": "runoff_votes_and_turnout.csv",
  "provinceColumn": "Province",
  "districtColumn": "District",
  "totalVotesColumn": "PopulationVoted",
  "candidateColumns": { "Ghani": "GhaniVotes", "Abdullah": "AbdullahVotes" }
}
```

The following providers are supported:
* `csv` (the default) Comma Separated Values with a header row
* `xlsx` Excel spreadsheets. The first worksheet is read, unless `excelWorksheetName`
  is given. The first row holds the column names.

File paths are relative to the configuration file.

### Province and district names

The same province is often spelled differently from one dataset to the other
(`KABUL`, `Kabul`, `Kunarha`, `Kunar`). Keys that do not match are an error: a
turnout cannot be computed for a district with votes and no population.
The `names` setting of a data source reconciles the spellings:

```json
"names": {
  "titleCase": true,
  "stripSpaces": false,
  "remove": [" Center"],
  "aliases": { "Kunarha": "Kunar" }
}
```

The rules are applied in this order: title case, removal of the spaces,
removal of the listed substrings, and finally the aliases (exact match).

## Constants

`votingFraction` is the share of the population that is eligible to vote.
It is either given directly (`{"value": 0.655}`) or as the ratio
`{"registeredVoters": 20845988, "population": 31822848}`, which are also the
defaults.

`thresholds.suspiciousBallotCap` (default 600) is the maximum number of
ballots a polling station receives. `thresholds.highTurnoutPercent` (default
95) is the turnout above which a district is reported.

## Analyses

* `provinces` the number of each province, by alphabetical order
* `turnout` the turnout of an election, by district or by province
* `turnout-distribution` the histogram of the district turnouts
* `winning-margin` the margin of a candidate over another, against the turnout
* `v-over-e` the votes of a candidate over the eligible population, against the turnout
* `vote-share` the vote share of a candidate, against the turnout
* `vote-share-distribution` the histogram of the vote shares over the polling stations of a province
* `suspicious-stations` the polling stations where a candidate got all the ballots,
  and the districts with a turnout above the threshold
* `observer-trends` the change of turnout against the change of observers between two elections

The turnout is always `100 * votes / (population * votingFraction)`. Values
above 100 are kept.

The fits are ordinary least squares. When all the fitted values are equal,
the correlation is reported as 0.

*/
