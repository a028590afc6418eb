use crate::types::*;
use chrono::{DateTime, Local, NaiveDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TournamentPhase {
    Running,
    Ready,
    Waiting,
}

#[derive(Clone, Debug)]
pub struct StatusBanner {
    pub phase: TournamentPhase,
    pub headline: String,
    pub player_line: String,
    pub launch_enabled: bool,
}

pub fn phase_of(status: &StatusPayload) -> TournamentPhase {
    if status.started {
        TournamentPhase::Running
    } else if status.player_count >= MIN_PLAYERS_TO_LAUNCH {
        TournamentPhase::Ready
    } else {
        TournamentPhase::Waiting
    }
}

pub fn launch_enabled(status: &StatusPayload) -> bool {
    !status.started && status.player_count >= MIN_PLAYERS_TO_LAUNCH
}

pub fn banner_from_status(status: &StatusPayload) -> StatusBanner {
    let phase = phase_of(status);
    let headline = match phase {
        TournamentPhase::Running => {
            let since = status
                .started_at
                .as_deref()
                .map(format_start_time)
                .unwrap_or_else(|| "unknown".to_string());
            format!("✅ Tournament running (since {since})")
        }
        TournamentPhase::Ready => "⚠️ Ready to launch: enough players connected.".to_string(),
        TournamentPhase::Waiting => "⛔ Waiting: not enough players.".to_string(),
    };
    StatusBanner {
        phase,
        headline,
        player_line: format!("👥 {} player(s) connected", status.player_count),
        launch_enabled: launch_enabled(status),
    }
}

/// Start timestamp in local display form. The server sends a naive
/// ISO 8601 timestamp; offset-carrying input is converted to local time,
/// anything unparseable passes through unchanged.
pub fn format_start_time(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed
            .with_timezone(&Local)
            .format("%d/%m/%Y %H:%M")
            .to_string();
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return naive.format("%d/%m/%Y %H:%M").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_status(started: bool, player_count: u32, started_at: Option<&str>) -> StatusPayload {
        StatusPayload {
            started,
            started_at: started_at.map(|s| s.to_string()),
            player_count,
        }
    }

    #[test]
    fn test_phase_classification() {
        assert_eq!(phase_of(&make_status(true, 0, None)), TournamentPhase::Running);
        assert_eq!(phase_of(&make_status(false, 2, None)), TournamentPhase::Ready);
        assert_eq!(phase_of(&make_status(false, 1, None)), TournamentPhase::Waiting);
        assert_eq!(phase_of(&make_status(false, 0, None)), TournamentPhase::Waiting);
    }

    #[test]
    fn test_launch_gating() {
        assert!(launch_enabled(&make_status(false, 2, None)));
        assert!(launch_enabled(&make_status(false, 8, None)));
        assert!(!launch_enabled(&make_status(false, 1, None)));
        assert!(!launch_enabled(&make_status(true, 8, None)));
    }

    #[test]
    fn test_banner_strings() {
        let banner = banner_from_status(&make_status(true, 4, Some("2026-08-20T18:30:00")));
        assert_eq!(banner.headline, "✅ Tournament running (since 20/08/2026 18:30)");
        assert_eq!(banner.player_line, "👥 4 player(s) connected");
        assert!(!banner.launch_enabled);

        let banner = banner_from_status(&make_status(false, 3, None));
        assert_eq!(banner.headline, "⚠️ Ready to launch: enough players connected.");
        assert!(banner.launch_enabled);

        let banner = banner_from_status(&make_status(false, 1, None));
        assert_eq!(banner.headline, "⛔ Waiting: not enough players.");
        assert!(!banner.launch_enabled);
    }

    #[test]
    fn test_running_without_timestamp_reads_unknown() {
        let banner = banner_from_status(&make_status(true, 2, None));
        assert_eq!(banner.headline, "✅ Tournament running (since unknown)");
    }

    #[test]
    fn test_format_start_time_naive_iso() {
        assert_eq!(format_start_time("2026-08-23T14:21:05.123456"), "23/08/2026 14:21");
        assert_eq!(format_start_time("2026-01-02T03:04:05"), "02/01/2026 03:04");
    }

    #[test]
    fn test_format_start_time_with_offset_still_formats() {
        let formatted = format_start_time("2026-08-23T14:21:05+00:00");
        assert_eq!(formatted.len(), "23/08/2026 14:21".len());
        assert!(formatted.contains('/'));
    }

    #[test]
    fn test_format_start_time_passes_garbage_through() {
        assert_eq!(format_start_time("soon"), "soon");
        assert_eq!(format_start_time(""), "");
    }
}
