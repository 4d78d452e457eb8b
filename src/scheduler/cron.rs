//! Disparadores de calendario a partir de expresiones cron de 5 campos.
//!
//! Formato: "MIN HORA DIA_MES MES DIA_SEMANA". Minuto, hora y día de la
//! semana aceptan `*`, `*/N`, `N`, `N-M` y listas separadas por comas.
//! Día del mes y mes solo aceptan `*`. Domingo es 0 (o 7).
//!
//! Ejemplos: "50 16 * * 1-5" (lunes a viernes 16:50), "0 12 * * 6"
//! (sábados 12:00).

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Weekday};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("Expresión cron inválida '{0}': se requieren 5 campos (MIN HORA DIA MES DIA_SEMANA)")]
    FieldCount(String),

    #[error("Campo '{campo}' inválido: '{valor}'")]
    InvalidField { campo: &'static str, valor: String },

    #[error("Campo '{0}' solo admite '*'")]
    Unsupported(&'static str),
}

/// Momento recurrente del calendario local
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarTrigger {
    expression: String,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    weekdays: Vec<Weekday>,
}

fn parse_field(campo: &'static str, field: &str, min: u32, max: u32) -> Result<Vec<u32>, CronError> {
    let invalid = || CronError::InvalidField { campo, valor: field.to_string() };

    let mut values = Vec::new();
    for part in field.split(',') {
        let part = part.trim();
        if part == "*" {
            values.extend(min..=max);
        } else if let Some(step) = part.strip_prefix("*/") {
            let n: u32 = step.parse().map_err(|_| invalid())?;
            if n == 0 {
                return Err(invalid());
            }
            values.extend((min..=max).step_by(n as usize));
        } else if let Some((from, to)) = part.split_once('-') {
            let from: u32 = from.parse().map_err(|_| invalid())?;
            let to: u32 = to.parse().map_err(|_| invalid())?;
            if from > to || from < min || to > max {
                return Err(invalid());
            }
            values.extend(from..=to);
        } else {
            let n: u32 = part.parse().map_err(|_| invalid())?;
            if n < min || n > max {
                return Err(invalid());
            }
            values.push(n);
        }
    }

    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn weekday_from_cron(n: u32) -> Weekday {
    match n % 7 {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

impl FromStr for CalendarTrigger {
    type Err = CronError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(CronError::FieldCount(expression.to_string()));
        }
        if parts[2] != "*" {
            return Err(CronError::Unsupported("dia_mes"));
        }
        if parts[3] != "*" {
            return Err(CronError::Unsupported("mes"));
        }

        let mut weekdays: Vec<Weekday> = parse_field("dia_semana", parts[4], 0, 7)?
            .into_iter()
            .map(weekday_from_cron)
            .collect();
        weekdays.dedup();

        Ok(Self {
            expression: expression.to_string(),
            minutes: parse_field("minuto", parts[0], 0, 59)?,
            hours: parse_field("hora", parts[1], 0, 23)?,
            weekdays,
        })
    }
}

impl CalendarTrigger {
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Próximo disparo estrictamente posterior a `after`, en la misma zona.
    /// Las horas locales que no existen (cambio de horario) se saltan.
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = after.timezone();
        let start = after.date_naive();

        for offset in 0..=7 {
            let date = start + Duration::days(offset);
            if !self.weekdays.contains(&date.weekday()) {
                continue;
            }
            for &hour in &self.hours {
                for &minute in &self.minutes {
                    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
                        continue;
                    };
                    let candidate = match tz.from_local_datetime(&date.and_time(time)).earliest() {
                        Some(c) => c,
                        None => continue,
                    };
                    if candidate > *after {
                        return Some(candidate);
                    }
                }
            }
        }
        None
    }
}
