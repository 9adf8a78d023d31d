//! End-to-end leaflet layout for one sheet: build blocks, measure, plan, compose.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::HospitalInfo;
use crate::layout::blocks::{
    advice_block, document_filename, header_block, schedule_block, section_blocks,
};
use crate::layout::composer::{compose, DocumentLayout, DocumentParts, FixedBlock, Footer};
use crate::layout::oracle::{ContentBlock, MeasurementOracle};
use crate::layout::planner::{LayoutError, LayoutPlan, LayoutPlanner};
use crate::parser::SheetFields;

#[derive(Debug, Clone, Serialize)]
pub struct SheetLayout {
    pub plan: LayoutPlan,
    pub document: DocumentLayout,
}

/// What a layout request prints around the sheet content.
#[derive(Debug, Clone)]
pub struct LayoutRequest<'a> {
    pub fields: &'a SheetFields,
    pub hospital: &'a HospitalInfo,
    pub patient: Option<&'a str>,
    pub date: NaiveDate,
}

/// Measures the header first, plans the sections below it, then measures the trailing blocks
/// and composes pages.
pub async fn layout_sheet<O>(
    planner: &LayoutPlanner,
    request: LayoutRequest<'_>,
    oracle: &mut O,
) -> Result<SheetLayout, LayoutError>
where
    O: MeasurementOracle + ?Sized,
{
    let geometry = planner.geometry();
    let principio = request.fields.principio_activo.as_str();

    let header = header_block(principio, request.hospital);
    let header = fixed(&header, measure_full(planner, &header, oracle).await?);

    let blocks = section_blocks(request.fields);
    let plan = planner.plan(&blocks, header.height, oracle).await?;

    let schedule = schedule_block(request.patient);
    let schedule = fixed(&schedule, measure_full(planner, &schedule, oracle).await?);
    let advice = advice_block();
    let advice = fixed(&advice, measure_full(planner, &advice, oracle).await?);

    let parts = DocumentParts {
        filename: document_filename(principio),
        header,
        schedule,
        advice,
        footer: Footer {
            hospital_name: request.hospital.name.clone(),
            date: request.date,
        },
    };
    let document = compose(geometry, &plan, &parts)?;

    info!(
        principio_activo = principio,
        sections = blocks.len(),
        pairs = plan.pairs.len(),
        escalated = plan.escalated,
        pages = document.page_count,
        "Leaflet layout composed"
    );

    Ok(SheetLayout { plan, document })
}

async fn measure_full<O>(
    planner: &LayoutPlanner,
    block: &ContentBlock,
    oracle: &mut O,
) -> Result<f64, LayoutError>
where
    O: MeasurementOracle + ?Sized,
{
    let width = planner.geometry().full_width();
    oracle
        .measure(block, width)
        .await
        .map_err(|source| LayoutError::MeasurementFailed {
            key: block.key.clone(),
            width_mm: width.width_mm,
            source,
        })
}

fn fixed(block: &ContentBlock, height: f64) -> FixedBlock {
    FixedBlock::new(block.key.clone(), height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::PageGeometry;
    use crate::layout::oracle::TextMetricsOracle;
    use crate::parser::{FieldKey, SectionParser};

    const SHEET: &str = "\
Principio activo: Metotrexato

¿Qué es y para qué se utiliza?
Es un medicamento que modula el sistema inmunitario. Se utiliza en la artritis reumatoide y en la psoriasis.

Administración
- Tome la dosis una vez por semana, siempre el mismo día.
- Trague los comprimidos enteros con un vaso de agua.

Olvido de dosis
Si olvida una dosis, consulte con su médico antes de tomarla.

Efectos adversos
- Náuseas
- Llagas en la boca
- Cansancio

Conservación
Conservar por debajo de 25 °C y protegido de la luz.
";

    fn request<'a>(fields: &'a SheetFields, hospital: &'a HospitalInfo) -> LayoutRequest<'a> {
        LayoutRequest {
            fields,
            hospital,
            patient: Some("Ana García"),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_layout_places_every_block_once() {
        let parsed = SectionParser::default().parse_text(SHEET);
        let hospital = HospitalInfo::default();
        let planner = LayoutPlanner::new(PageGeometry::a4()).unwrap();
        let mut oracle = TextMetricsOracle::default();

        let layout = layout_sheet(&planner, request(&parsed.fields, &hospital), &mut oracle)
            .await
            .unwrap();

        let placed: Vec<&str> = layout
            .document
            .pages
            .iter()
            .flat_map(|p| p.placements.iter().map(|pl| pl.key.as_str()))
            .collect();
        assert_eq!(
            placed,
            vec![
                "header",
                "que_es_para_que",
                "administracion",
                "olvido_dosis",
                "efectos_adversos",
                "conservacion",
                "schedule",
                "advice",
            ]
        );
        assert_eq!(layout.document.filename, "hoja_Metotrexato.pdf");
        assert_eq!(layout.document.page_count, layout.document.pages.len());
        // header + 5 sections + schedule + advice, no pairing needed for a short sheet.
        assert_eq!(oracle.calls(), 8);
        assert!(layout.plan.pairs.is_empty());
    }

    #[tokio::test]
    async fn test_long_sheet_stays_in_order_and_within_pages() {
        let mut fields = SheetFields::default();
        fields.set(FieldKey::PrincipioActivo, "Tacrolimus".to_string());
        let paragraph = "Este medicamento debe tomarse siempre a la misma hora, con o sin comida, \
                         pero siempre de la misma forma cada día. ";
        for key in FieldKey::LEAFLET_ORDER {
            fields.set(key, paragraph.repeat(6));
        }
        fields.set(FieldKey::OlvidoDosis, "Tome la dosis olvidada en cuanto se acuerde.".to_string());
        fields.set(FieldKey::Excipientes, "Lactosa monohidrato.".to_string());

        let hospital = HospitalInfo::default();
        let planner = LayoutPlanner::new(PageGeometry::a4()).unwrap();
        let mut oracle = TextMetricsOracle::default();
        let layout = layout_sheet(&planner, request(&fields, &hospital), &mut oracle)
            .await
            .unwrap();

        assert_eq!(layout.plan.flatten_indices(), (0..8).collect::<Vec<_>>());
        let bottom = planner.geometry().content_bottom_mm();
        for page in &layout.document.pages {
            for placement in &page.placements {
                assert!(placement.y + placement.height <= bottom + 1e-9 || page.placements.len() == 1);
            }
        }
    }

    #[tokio::test]
    async fn test_narrow_container_surfaces_measurement_error() {
        let geometry = PageGeometry {
            container_width_px: 50.0,
            ..PageGeometry::a4()
        };
        let fields = SheetFields::default();
        let hospital = HospitalInfo::default();
        let planner = LayoutPlanner::new(geometry).unwrap();
        let mut oracle = TextMetricsOracle::default();

        let err = layout_sheet(&planner, request(&fields, &hospital), &mut oracle)
            .await
            .unwrap_err();
        match err {
            LayoutError::MeasurementFailed { key, .. } => assert_eq!(key, "header"),
            other => panic!("expected MeasurementFailed, got {other:?}"),
        }
    }
}
