//! Content blocks printed on a leaflet: the page header, one block per filled section, the
//! administration schedule and the closing advice.

use crate::config::HospitalInfo;
use crate::layout::oracle::{BlockStyle, ContentBlock};
use crate::parser::{FieldKey, SheetFields};

pub const HEADER_KEY: &str = "header";
pub const SCHEDULE_KEY: &str = "schedule";
pub const ADVICE_KEY: &str = "advice";

pub const HEADER_SUBTITLE: &str = "Hoja informativa para el paciente";
pub const PHARMACY_SERVICE: &str = "Servicio de Farmacia Hospitalaria";
pub const SCHEDULE_TITLE: &str = "Esquema individualizado de administración";
pub const ADVICE_TITLE: &str = "Y recuerde.........";

/// Hours printed on the schedule grid.
pub const SCHEDULE_HOURS: std::ops::RangeInclusive<u8> = 8..=24;

/// Blank lines left for handwritten observations under the schedule.
const OBSERVATION_LINES: usize = 2;

pub const ADVICE_TIPS: [&str; 7] = [
    "Tome su medicamento exactamente como le ha indicado su médico.",
    "Este medicamento se le ha prescrito a usted personalmente y no debe ser utilizado por otras personas, ya que puede perjudicarles aunque tengan síntomas similares a los suyos.",
    "Informe a su médico o farmacéutico si está tomando o ha tomado recientemente otros medicamentos, incluso los adquiridos sin receta.",
    "Mantenga sus medicamentos fuera de la vista y del alcance de los niños.",
    "No utilice su medicamento una vez superada su fecha de caducidad (el último día del mes indicado en el envase).",
    "Conserve sus medicamentos, siempre que sea posible, en su envase original.",
    "Devuelva la medicación no utilizada a la farmacia del hospital.",
];

pub const CLOSING_NOTICE: [&str; 2] = [
    "ESTA INFORMACIÓN NO SUSTITUYE AL PROSPECTO",
    "CONSULTE A SU MÉDICO O FARMACÉUTICO",
];

/// One section block per non-empty field, in leaflet order. The active ingredient goes in the
/// header instead. A whitespace-only field still counts as content and gets its block.
pub fn section_blocks(fields: &SheetFields) -> Vec<ContentBlock> {
    FieldKey::LEAFLET_ORDER
        .iter()
        .filter(|key| !fields.get(**key).is_empty())
        .map(|key| ContentBlock::section(key.as_str(), key.heading(), fields.get(*key)))
        .collect()
}

pub fn header_block(principio_activo: &str, hospital: &HospitalInfo) -> ContentBlock {
    let mut lines = vec![principio_activo.to_string(), HEADER_SUBTITLE.to_string()];
    if hospital.is_configured() {
        lines.push(PHARMACY_SERVICE.to_string());
        lines.extend(hospital.name.clone());
        lines.extend(hospital.phone.as_ref().map(|p| format!("Tel: {p}")));
        lines.extend(hospital.email.clone());
    }

    ContentBlock {
        key: HEADER_KEY.to_string(),
        label: principio_activo.to_string(),
        raw_text: lines.join("\n"),
        style: BlockStyle::Banner,
    }
}

/// Schedule grid. A missing patient name leaves the line blank for handwriting.
pub fn schedule_block(patient: Option<&str>) -> ContentBlock {
    let patient_line = match patient.map(str::trim).filter(|p| !p.is_empty()) {
        Some(name) => format!("PACIENTE: {name}"),
        None => "PACIENTE: ____________________".to_string(),
    };
    let hours = SCHEDULE_HOURS
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![SCHEDULE_TITLE.to_uppercase(), patient_line, hours];
    lines.push("OBSERVACIONES:".to_string());
    lines.extend(std::iter::repeat("____________________".to_string()).take(OBSERVATION_LINES));

    ContentBlock {
        key: SCHEDULE_KEY.to_string(),
        label: SCHEDULE_TITLE.to_string(),
        raw_text: lines.join("\n"),
        style: BlockStyle::Schedule,
    }
}

pub fn advice_block() -> ContentBlock {
    let mut lines = vec![ADVICE_TITLE];
    lines.extend(ADVICE_TIPS);
    lines.extend(CLOSING_NOTICE);

    ContentBlock {
        key: ADVICE_KEY.to_string(),
        label: ADVICE_TITLE.to_string(),
        raw_text: lines.join("\n"),
        style: BlockStyle::Banner,
    }
}

/// Download name for a sheet: `hoja_<ingredient>.pdf`, anything outside ASCII alphanumerics and
/// Spanish accented letters replaced by `_`.
pub fn document_filename(principio_activo: &str) -> String {
    let base = if principio_activo.is_empty() {
        "medicamento"
    } else {
        principio_activo
    };
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || "áéíóúñÁÉÍÓÚÑ".contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("hoja_{sanitized}.pdf")
}
