//! Hebrew (lunisolar) calendar dates and conversion to Gregorian.
//!
//! The conversion uses the classic elapsed-days computation: count lunar
//! months since the epoch, locate the Tishrei molad, apply the four
//! postponement rules, and lay months out according to the year length.
//! Day numbers are rata die (days since 0001-01-01 in the proleptic
//! Gregorian calendar), which is the same day numbering chrono uses for
//! `NaiveDate::from_num_days_from_ce_opt`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{LuachError, LuachResult};

/// Rata-die day number of the Hebrew epoch (1 Tishrei, year 1).
const EPOCH: i64 = -1_373_428;

/// A month of the Hebrew calendar.
///
/// `Adar` is the single Adar of common years and doubles as Adar II in leap
/// years; `AdarI` only exists in leap years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HebrewMonth {
    Tishrei,
    Cheshvan,
    Kislev,
    Tevet,
    Shevat,
    AdarI,
    Adar,
    Nisan,
    Iyar,
    Sivan,
    Tammuz,
    Av,
    Elul,
}

impl HebrewMonth {
    /// Months of a year in civil order (starting at Tishrei).
    pub fn civil_order(year: i32) -> &'static [HebrewMonth] {
        use HebrewMonth::*;
        if is_leap_year(year) {
            &[
                Tishrei, Cheshvan, Kislev, Tevet, Shevat, AdarI, Adar, Nisan, Iyar, Sivan, Tammuz,
                Av, Elul,
            ]
        } else {
            &[
                Tishrei, Cheshvan, Kislev, Tevet, Shevat, Adar, Nisan, Iyar, Sivan, Tammuz, Av,
                Elul,
            ]
        }
    }
}

impl fmt::Display for HebrewMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HebrewMonth::Tishrei => "Tishrei",
            HebrewMonth::Cheshvan => "Cheshvan",
            HebrewMonth::Kislev => "Kislev",
            HebrewMonth::Tevet => "Tevet",
            HebrewMonth::Shevat => "Shevat",
            HebrewMonth::AdarI => "Adar I",
            HebrewMonth::Adar => "Adar",
            HebrewMonth::Nisan => "Nisan",
            HebrewMonth::Iyar => "Iyar",
            HebrewMonth::Sivan => "Sivan",
            HebrewMonth::Tammuz => "Tammuz",
            HebrewMonth::Av => "Av",
            HebrewMonth::Elul => "Elul",
        };
        f.write_str(name)
    }
}

impl FromStr for HebrewMonth {
    type Err = LuachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        let month = match normalized.as_str() {
            "tishrei" | "tishri" => HebrewMonth::Tishrei,
            "cheshvan" | "heshvan" | "marcheshvan" => HebrewMonth::Cheshvan,
            "kislev" => HebrewMonth::Kislev,
            "tevet" | "teves" => HebrewMonth::Tevet,
            "shevat" | "shvat" => HebrewMonth::Shevat,
            "adari" | "adar1" => HebrewMonth::AdarI,
            "adar" | "adarii" | "adar2" => HebrewMonth::Adar,
            "nisan" | "nissan" => HebrewMonth::Nisan,
            "iyar" | "iyyar" => HebrewMonth::Iyar,
            "sivan" => HebrewMonth::Sivan,
            "tammuz" | "tamuz" => HebrewMonth::Tammuz,
            "av" => HebrewMonth::Av,
            "elul" => HebrewMonth::Elul,
            _ => {
                return Err(LuachError::Validation(format!(
                    "Unknown Hebrew month: '{}'",
                    s
                )));
            }
        };
        Ok(month)
    }
}

/// A date in the Hebrew calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HebrewDate {
    pub year: i32,
    pub month: HebrewMonth,
    pub day: u8,
}

impl HebrewDate {
    /// Construct a date, validating that it actually exists in `year`.
    pub fn new(year: i32, month: HebrewMonth, day: u8) -> LuachResult<Self> {
        if year < 1 {
            return Err(LuachError::Validation(format!(
                "Hebrew year must be positive, got {}",
                year
            )));
        }
        if month == HebrewMonth::AdarI && !is_leap_year(year) {
            return Err(LuachError::Validation(format!(
                "Adar I does not exist in non-leap year {}",
                year
            )));
        }
        let len = month_length(year, month);
        if day == 0 || day > len {
            return Err(LuachError::Validation(format!(
                "{} {} has {} days, got day {}",
                month, year, len, day
            )));
        }
        Ok(HebrewDate { year, month, day })
    }

    /// Convert to the equivalent Gregorian date.
    pub fn to_gregorian(self) -> NaiveDate {
        // Tolerate an Adar I month paired with a non-leap year (e.g. a date
        // built by hand instead of through `new`/`anniversary_in`).
        let month = match self.month {
            HebrewMonth::AdarI if !is_leap_year(self.year) => HebrewMonth::Adar,
            m => m,
        };
        let mut rd = EPOCH + elapsed_days(self.year) + i64::from(self.day) - 1;
        for &m in HebrewMonth::civil_order(self.year) {
            if m == month {
                break;
            }
            rd += i64::from(month_length(self.year, m));
        }
        NaiveDate::from_num_days_from_ce_opt(rd as i32)
            .expect("valid Hebrew years map inside chrono's date range")
    }

    /// The anniversary of this date in another Hebrew year.
    ///
    /// Adar I anchors fall on Adar in years without a leap month, and day-30
    /// anchors clamp to day 29 when the target year's month is short.
    pub fn anniversary_in(self, year: i32) -> HebrewDate {
        let month = match self.month {
            HebrewMonth::AdarI if !is_leap_year(year) => HebrewMonth::Adar,
            m => m,
        };
        let day = self.day.min(month_length(year, month));
        HebrewDate { year, month, day }
    }
}

impl fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month, self.year)
    }
}

/// Whether a Hebrew year has a leap month.
pub fn is_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

/// Days from the epoch to 1 Tishrei of `year`, with postponements applied.
fn elapsed_days(year: i32) -> i64 {
    let year = i64::from(year);
    let months_elapsed =
        235 * ((year - 1) / 19) + 12 * ((year - 1) % 19) + (7 * ((year - 1) % 19) + 1) / 19;
    let parts_elapsed = 204 + 793 * (months_elapsed % 1080);
    let hours_elapsed =
        5 + 12 * months_elapsed + 793 * (months_elapsed / 1080) + parts_elapsed / 1080;
    let day = 1 + 29 * months_elapsed + hours_elapsed / 24;
    let parts = 1080 * (hours_elapsed % 24) + parts_elapsed % 1080;

    let leap = |y: i64| (7 * y + 1).rem_euclid(19) < 7;
    let mut alt = if parts >= 19440
        || (day % 7 == 2 && parts >= 9924 && !leap(year))
        || (day % 7 == 1 && parts >= 16789 && leap(year - 1))
    {
        day + 1
    } else {
        day
    };
    if matches!(alt % 7, 0 | 3 | 5) {
        alt += 1;
    }
    alt
}

/// Number of days in a Hebrew year (353, 354, 355, 383, 384 or 385).
pub fn year_length(year: i32) -> i64 {
    elapsed_days(year + 1) - elapsed_days(year)
}

/// Number of days in a month of a given year.
pub fn month_length(year: i32, month: HebrewMonth) -> u8 {
    match month {
        HebrewMonth::Tishrei
        | HebrewMonth::Shevat
        | HebrewMonth::AdarI
        | HebrewMonth::Nisan
        | HebrewMonth::Sivan
        | HebrewMonth::Av => 30,
        HebrewMonth::Tevet
        | HebrewMonth::Adar
        | HebrewMonth::Iyar
        | HebrewMonth::Tammuz
        | HebrewMonth::Elul => 29,
        // Cheshvan is long only in "complete" years, Kislev short only in
        // "deficient" ones; both are read off the year length.
        HebrewMonth::Cheshvan => {
            if year_length(year) % 10 == 5 {
                30
            } else {
                29
            }
        }
        HebrewMonth::Kislev => {
            if year_length(year) % 10 == 3 {
                29
            } else {
                30
            }
        }
    }
}

/// The Hebrew year containing a Gregorian date.
pub fn year_of(date: NaiveDate) -> i32 {
    let ord = i64::from(date.num_days_from_ce());
    let mut year = date.year() + 3760;
    while EPOCH + elapsed_days(year + 1) <= ord {
        year += 1;
    }
    while EPOCH + elapsed_days(year) > ord {
        year -= 1;
    }
    year
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rosh_hashanah_known_dates() {
        let cases = [
            (5770, date(2009, 9, 19)),
            (5780, date(2019, 9, 30)),
            (5784, date(2023, 9, 16)),
            (5785, date(2024, 10, 3)),
            (5786, date(2025, 9, 23)),
            (5790, date(2029, 9, 10)),
        ];
        for (year, expected) in cases {
            let rh = HebrewDate::new(year, HebrewMonth::Tishrei, 1).unwrap();
            assert_eq!(rh.to_gregorian(), expected, "1 Tishrei {}", year);
        }
    }

    #[test]
    fn mid_year_known_dates() {
        // Pesach 5784 (leap year)
        let pesach = HebrewDate::new(5784, HebrewMonth::Nisan, 15).unwrap();
        assert_eq!(pesach.to_gregorian(), date(2024, 4, 23));

        // Yom Kippur 5786
        let yk = HebrewDate::new(5786, HebrewMonth::Tishrei, 10).unwrap();
        assert_eq!(yk.to_gregorian(), date(2025, 10, 2));

        // Chanukah 5785
        let chanukah = HebrewDate::new(5785, HebrewMonth::Kislev, 25).unwrap();
        assert_eq!(chanukah.to_gregorian(), date(2024, 12, 26));

        // Purim 5784 falls in Adar II
        let purim = HebrewDate::new(5784, HebrewMonth::Adar, 14).unwrap();
        assert_eq!(purim.to_gregorian(), date(2024, 3, 24));

        let purim_katan = HebrewDate::new(5784, HebrewMonth::AdarI, 14).unwrap();
        assert_eq!(purim_katan.to_gregorian(), date(2024, 2, 23));
    }

    #[test]
    fn leap_years_follow_the_19_year_cycle() {
        assert!(is_leap_year(5784));
        assert!(is_leap_year(5760));
        assert!(!is_leap_year(5785));
        assert!(!is_leap_year(5786));
        assert!(!is_leap_year(5770));
    }

    #[test]
    fn year_lengths_are_valid() {
        assert_eq!(year_length(5784), 383);
        assert_eq!(year_length(5785), 355);
        assert_eq!(year_length(5786), 354);
        for year in 5600..5900 {
            assert!(
                matches!(year_length(year), 353 | 354 | 355 | 383 | 384 | 385),
                "year {} has impossible length {}",
                year,
                year_length(year)
            );
        }
    }

    #[test]
    fn year_of_flips_at_rosh_hashanah() {
        assert_eq!(year_of(date(2023, 9, 15)), 5783);
        assert_eq!(year_of(date(2023, 9, 16)), 5784);
        assert_eq!(year_of(date(2024, 10, 2)), 5784);
        assert_eq!(year_of(date(2024, 10, 3)), 5785);
    }

    #[test]
    fn anniversary_stays_put_in_ordinary_years() {
        let anchor = HebrewDate::new(5770, HebrewMonth::Sivan, 12).unwrap();
        assert_eq!(anchor.to_gregorian(), date(2010, 5, 25));
        assert_eq!(
            anchor.anniversary_in(5771).to_gregorian(),
            date(2011, 6, 14)
        );
        assert_eq!(
            anchor.anniversary_in(5772).to_gregorian(),
            date(2012, 6, 2)
        );
    }

    #[test]
    fn anniversary_clamps_short_cheshvan() {
        // Cheshvan has 30 days in 5785 but only 29 in 5786.
        let anchor = HebrewDate::new(5785, HebrewMonth::Cheshvan, 30).unwrap();
        assert_eq!(anchor.to_gregorian(), date(2024, 12, 1));

        let next = anchor.anniversary_in(5786);
        assert_eq!(next.day, 29);
        assert_eq!(next.to_gregorian(), date(2025, 11, 20));
    }

    #[test]
    fn anniversary_folds_adar_i_into_adar() {
        let anchor = HebrewDate::new(5784, HebrewMonth::AdarI, 14).unwrap();
        let common = anchor.anniversary_in(5785);
        assert_eq!(common.month, HebrewMonth::Adar);
        assert_eq!(common.to_gregorian(), date(2025, 3, 14));
    }

    #[test]
    fn invalid_dates_are_rejected() {
        assert!(HebrewDate::new(5785, HebrewMonth::AdarI, 10).is_err());
        assert!(HebrewDate::new(5785, HebrewMonth::Elul, 30).is_err());
        assert!(HebrewDate::new(5786, HebrewMonth::Cheshvan, 30).is_err());
        assert!(HebrewDate::new(5785, HebrewMonth::Tishrei, 0).is_err());
        assert!(HebrewDate::new(0, HebrewMonth::Tishrei, 1).is_err());
    }

    #[test]
    fn month_parsing_accepts_common_spellings() {
        assert_eq!("Tishrei".parse::<HebrewMonth>().unwrap(), HebrewMonth::Tishrei);
        assert_eq!("heshvan".parse::<HebrewMonth>().unwrap(), HebrewMonth::Cheshvan);
        assert_eq!("adar".parse::<HebrewMonth>().unwrap(), HebrewMonth::Adar);
        assert_eq!("Adar I".parse::<HebrewMonth>().unwrap(), HebrewMonth::AdarI);
        assert_eq!("adar-ii".parse::<HebrewMonth>().unwrap(), HebrewMonth::Adar);
        assert!("flurble".parse::<HebrewMonth>().is_err());
    }
}
