// Static NBA team table, matching the ids the stats service uses.

/// A franchise as identified by the stats service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    pub id: u32,
    pub abbreviation: &'static str,
    pub full_name: &'static str,
}

const fn team(id: u32, abbreviation: &'static str, full_name: &'static str) -> Team {
    Team {
        id,
        abbreviation,
        full_name,
    }
}

pub const NBA_TEAMS: &[Team] = &[
    team(1610612737, "ATL", "Atlanta Hawks"),
    team(1610612738, "BOS", "Boston Celtics"),
    team(1610612739, "CLE", "Cleveland Cavaliers"),
    team(1610612740, "NOP", "New Orleans Pelicans"),
    team(1610612741, "CHI", "Chicago Bulls"),
    team(1610612742, "DAL", "Dallas Mavericks"),
    team(1610612743, "DEN", "Denver Nuggets"),
    team(1610612744, "GSW", "Golden State Warriors"),
    team(1610612745, "HOU", "Houston Rockets"),
    team(1610612746, "LAC", "LA Clippers"),
    team(1610612747, "LAL", "Los Angeles Lakers"),
    team(1610612748, "MIA", "Miami Heat"),
    team(1610612749, "MIL", "Milwaukee Bucks"),
    team(1610612750, "MIN", "Minnesota Timberwolves"),
    team(1610612751, "BKN", "Brooklyn Nets"),
    team(1610612752, "NYK", "New York Knicks"),
    team(1610612753, "ORL", "Orlando Magic"),
    team(1610612754, "IND", "Indiana Pacers"),
    team(1610612755, "PHI", "Philadelphia 76ers"),
    team(1610612756, "PHX", "Phoenix Suns"),
    team(1610612757, "POR", "Portland Trail Blazers"),
    team(1610612758, "SAC", "Sacramento Kings"),
    team(1610612759, "SAS", "San Antonio Spurs"),
    team(1610612760, "OKC", "Oklahoma City Thunder"),
    team(1610612761, "TOR", "Toronto Raptors"),
    team(1610612762, "UTA", "Utah Jazz"),
    team(1610612763, "MEM", "Memphis Grizzlies"),
    team(1610612764, "WAS", "Washington Wizards"),
    team(1610612765, "DET", "Detroit Pistons"),
    team(1610612766, "CHA", "Charlotte Hornets"),
];

/// Look a team up by full name or abbreviation, ignoring case.
pub fn find_team(name: &str) -> Option<&'static Team> {
    let name = name.trim();
    NBA_TEAMS.iter().find(|t| {
        t.full_name.eq_ignore_ascii_case(name) || t.abbreviation.eq_ignore_ascii_case(name)
    })
}

/// Full team names, sorted, for a team picker.
pub fn team_names() -> Vec<&'static str> {
    let mut names: Vec<_> = NBA_TEAMS.iter().map(|t| t.full_name).collect();
    names.sort_unstable();
    names
}
