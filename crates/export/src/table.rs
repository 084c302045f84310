use hygro_core::{Channel, Mode};
use hygro_series::Snapshot;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

/// Time column header shared by every sheet.
pub const TIME_COLUMN: &str = "Tempo_s";

/// One worksheet: the time column plus one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub channel: Channel,
    pub time:    Vec<f64>,
    pub values:  Vec<f64>,
}

impl Table {
    pub fn sheet_name(&self) -> &'static str {
        self.channel.sheet_name()
    }

    pub fn headers(&self) -> [&'static str; 2] {
        [TIME_COLUMN, self.channel.column_name()]
    }
}

/// One table per active channel, all cut from the same snapshot.
pub fn tables(snapshot: &Snapshot, mode: Mode) -> Vec<Table> {
    mode.channels()
        .iter()
        .map(|&channel| Table {
            channel,
            time: snapshot.time.clone(),
            values: snapshot.channel(channel),
        })
        .collect()
}

/// Write `tables` as sheets of one workbook at `path`.
pub fn write_workbook(tables: &[Table], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();

    for table in tables {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.sheet_name())?;

        for (col, header) in (0u16..).zip(table.headers()) {
            sheet.write_string(0, col, header)?;
        }
        for (row, (&t, &v)) in (1u32..).zip(table.time.iter().zip(&table.values)) {
            sheet.write_number(row, 0, t)?;
            sheet.write_number(row, 1, v)?;
        }
    }

    workbook.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            time:        vec![0.0, 0.5, 1.25],
            temperature: vec![22.0, 22.1, 22.3],
            humidity:    vec![60, 61, 61],
        }
    }

    #[test]
    fn single_mode_has_one_sheet() {
        let tables = tables(&snapshot(), Mode::Temperature);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].sheet_name(), "Temperatura");
        assert_eq!(tables[0].headers(), ["Tempo_s", "Temperatura_C"]);
        assert_eq!(tables[0].values, vec![22.0, 22.1, 22.3]);
    }

    #[test]
    fn both_mode_shares_the_time_column() {
        let tables = tables(&snapshot(), Mode::Both);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].sheet_name(), "Umidita");
        assert_eq!(tables[0].headers(), ["Tempo_s", "Umidita_%"]);
        assert_eq!(tables[1].sheet_name(), "Temperatura");
        assert_eq!(tables[0].time, tables[1].time);
        assert_eq!(tables[0].values, vec![60.0, 61.0, 61.0]);
    }

    #[test]
    fn workbook_round_trips_through_disk() {
        use calamine::{open_workbook, Data, Reader, Xlsx};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.xlsx");
        write_workbook(&tables(&snapshot(), Mode::Both), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Umidita", "Temperatura"]);

        let humidity = workbook.worksheet_range("Umidita").unwrap();
        let temperature = workbook.worksheet_range("Temperatura").unwrap();
        assert_eq!(humidity.get_size(), (4, 2));
        assert_eq!(temperature.get_size(), (4, 2));

        let header = |range: &calamine::Range<Data>| -> Vec<Data> {
            range.rows().next().unwrap().to_vec()
        };
        assert_eq!(
            header(&humidity),
            vec![Data::String("Tempo_s".into()), Data::String("Umidita_%".into())]
        );
        assert_eq!(
            header(&temperature),
            vec![Data::String("Tempo_s".into()), Data::String("Temperatura_C".into())]
        );

        let time = |range: &calamine::Range<Data>| -> Vec<Data> {
            range.rows().skip(1).map(|row| row[0].clone()).collect()
        };
        assert_eq!(time(&humidity), time(&temperature));
        assert_eq!(
            time(&humidity),
            vec![Data::Float(0.0), Data::Float(0.5), Data::Float(1.25)]
        );

        let values: Vec<Data> = temperature.rows().skip(1).map(|row| row[1].clone()).collect();
        assert_eq!(values, vec![Data::Float(22.0), Data::Float(22.1), Data::Float(22.3)]);
    }
}
