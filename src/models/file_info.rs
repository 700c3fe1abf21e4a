use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{GRIB2_EXTENSION, GZIP_EXTENSION};

/// Accumulation period of a QPE sub-product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum AccumulationPeriod {
    OneHour,
    ThreeHours,
    SixHours,
    TwelveHours,
    OneDay,
    TwoDays,
    ThreeDays,
}

impl AccumulationPeriod {
    pub const ALL: [AccumulationPeriod; 7] = [
        AccumulationPeriod::OneHour,
        AccumulationPeriod::ThreeHours,
        AccumulationPeriod::SixHours,
        AccumulationPeriod::TwelveHours,
        AccumulationPeriod::OneDay,
        AccumulationPeriod::TwoDays,
        AccumulationPeriod::ThreeDays,
    ];

    pub fn hours(&self) -> u32 {
        match self {
            AccumulationPeriod::OneHour => 1,
            AccumulationPeriod::ThreeHours => 3,
            AccumulationPeriod::SixHours => 6,
            AccumulationPeriod::TwelveHours => 12,
            AccumulationPeriod::OneDay => 24,
            AccumulationPeriod::TwoDays => 48,
            AccumulationPeriod::ThreeDays => 72,
        }
    }
}

impl TryFrom<u32> for AccumulationPeriod {
    type Error = ProcessingError;

    fn try_from(hours: u32) -> Result<Self> {
        AccumulationPeriod::ALL
            .into_iter()
            .find(|p| p.hours() == hours)
            .ok_or_else(|| {
                ProcessingError::InvalidArgument(format!(
                    "Unsupported period {}h, expected one of 1, 3, 6, 12, 24, 48, 72",
                    hours
                ))
            })
    }
}

impl From<AccumulationPeriod> for u32 {
    fn from(period: AccumulationPeriod) -> u32 {
        period.hours()
    }
}

impl std::fmt::Display for AccumulationPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hours())
    }
}

/// Processing pass: pass 1 has lower latency, pass 2 more gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ProcessingPass {
    One,
    Two,
}

impl ProcessingPass {
    pub fn number(&self) -> u32 {
        match self {
            ProcessingPass::One => 1,
            ProcessingPass::Two => 2,
        }
    }
}

impl TryFrom<u32> for ProcessingPass {
    type Error = ProcessingError;

    fn try_from(number: u32) -> Result<Self> {
        match number {
            1 => Ok(ProcessingPass::One),
            2 => Ok(ProcessingPass::Two),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unsupported pass number {}, expected 1 or 2",
                number
            ))),
        }
    }
}

impl From<ProcessingPass> for u32 {
    fn from(pass: ProcessingPass) -> u32 {
        pass.number()
    }
}

impl std::fmt::Display for ProcessingPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Acquisition parameters recovered from an MRMS QPE filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub id: String,
    pub period: AccumulationPeriod,
    pub pass_no: ProcessingPass,
    pub datetime: DateTime<Utc>,
    pub gzip: bool,
}

fn filename_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<id>MRMS_MultiSensor_QPE_(?P<period>\d{2})H_Pass(?P<pass>\d)_\d+\.\d+_(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})-(?P<hour>\d{2})0000)\.grib2(?P<gzip>\.gz)?$",
        )
        .expect("filename pattern is a valid regex")
    })
}

impl FileInfo {
    /// Parse the base name of `path` against the MRMS QPE filename grammar.
    pub fn parse(path: &str) -> Result<Self> {
        let filename = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ProcessingError::invalid_filename(path))?;

        let caps = filename_pattern()
            .captures(filename)
            .ok_or_else(|| ProcessingError::invalid_filename(filename))?;

        let number = |name: &str| -> Result<u32> {
            caps[name]
                .parse::<u32>()
                .map_err(|_| ProcessingError::invalid_filename(filename))
        };

        let period = AccumulationPeriod::try_from(number("period")?)
            .map_err(|_| ProcessingError::invalid_filename(filename))?;
        let pass_no = ProcessingPass::try_from(number("pass")?)
            .map_err(|_| ProcessingError::invalid_filename(filename))?;

        let datetime = NaiveDate::from_ymd_opt(
            number("year")? as i32,
            number("month")?,
            number("day")?,
        )
        .and_then(|date| date.and_hms_opt(number("hour").ok()?, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ProcessingError::invalid_filename(filename))?;

        Ok(Self {
            id: caps["id"].to_string(),
            period,
            pass_no,
            datetime,
            gzip: caps.name("gzip").is_some(),
        })
    }

    /// Filename this record was parsed from.
    pub fn filename(&self) -> String {
        let mut name = format!("{}{}", self.id, GRIB2_EXTENSION);
        if self.gzip {
            name.push_str(GZIP_EXTENSION);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-120000.grib2.gz";

    #[test]
    fn test_parse_compressed_file() {
        let info = FileInfo::parse(SAMPLE).unwrap();

        assert_eq!(info.id, "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-120000");
        assert_eq!(info.period, AccumulationPeriod::OneHour);
        assert_eq!(info.pass_no, ProcessingPass::One);
        assert_eq!(
            info.datetime,
            Utc.with_ymd_and_hms(2022, 6, 1, 12, 0, 0).unwrap()
        );
        assert!(info.gzip);
    }

    #[test]
    fn test_parse_uses_base_name() {
        let info = FileInfo::parse(
            "/data/HAWAII/MRMS_MultiSensor_QPE_72H_Pass2_00.00_20220601-230000.grib2",
        )
        .unwrap();

        assert_eq!(info.period.hours(), 72);
        assert_eq!(info.pass_no.number(), 2);
        assert_eq!(info.datetime.hour(), 23);
        assert_eq!(info.datetime.minute(), 0);
        assert!(!info.gzip);
    }

    #[test]
    fn test_filename_reconstruction() {
        let names = [
            SAMPLE,
            "MRMS_MultiSensor_QPE_12H_Pass2_00.00_20220602-000000.grib2.gz",
            "MRMS_MultiSensor_QPE_24H_Pass2_00.00_20220602-030000.grib2.gz",
            "MRMS_MultiSensor_QPE_72H_Pass2_00.00_20220601-230000.grib2",
            "MRMS_MultiSensor_QPE_48H_Pass1_12.34_19991231-050000.grib2",
        ];

        for name in names {
            let info = FileInfo::parse(name).unwrap();
            assert_eq!(info.filename(), name);
        }
    }

    #[test]
    fn test_all_periods_accepted() {
        for period in AccumulationPeriod::ALL {
            let name = format!(
                "MRMS_MultiSensor_QPE_{:02}H_Pass1_00.00_20220601-120000.grib2",
                period.hours()
            );
            assert_eq!(FileInfo::parse(&name).unwrap().period, period);
        }
    }

    #[test]
    fn test_invalid_filenames() {
        let invalid = [
            // missing pass digit
            "MRMS_MultiSensor_QPE_01H_Pass_00.00_20220601-120000.grib2.gz",
            // three-digit period
            "MRMS_MultiSensor_QPE_001H_Pass1_00.00_20220601-120000.grib2.gz",
            // non-numeric date
            "MRMS_MultiSensor_QPE_01H_Pass1_00.00_2022O601-120000.grib2.gz",
            // period outside the product set
            "MRMS_MultiSensor_QPE_02H_Pass1_00.00_20220601-120000.grib2",
            // pass outside the product set
            "MRMS_MultiSensor_QPE_01H_Pass3_00.00_20220601-120000.grib2",
            // impossible calendar date
            "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20221301-120000.grib2",
            // impossible hour
            "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-250000.grib2",
            // minutes are not zero
            "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-123000.grib2",
            // wrong raster extension
            "MRMS_MultiSensor_QPE_01H_Pass1_00.00_20220601-120000.tif",
            "",
        ];

        for name in invalid {
            let err = FileInfo::parse(name).unwrap_err();
            assert!(
                matches!(err, ProcessingError::InvalidFilename { .. }),
                "{} should be rejected, got {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_period_and_pass_conversions() {
        assert_eq!(AccumulationPeriod::try_from(24).unwrap(), AccumulationPeriod::OneDay);
        assert!(AccumulationPeriod::try_from(5).is_err());
        assert_eq!(ProcessingPass::try_from(2).unwrap(), ProcessingPass::Two);
        assert!(ProcessingPass::try_from(0).is_err());
    }
}
