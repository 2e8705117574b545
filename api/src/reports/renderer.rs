//! Documentation renderer
//!
//! Renders the roadmap, testing and timeline reports to Markdown. Content is
//! fixed; only the generation date varies.

use chrono::NaiveDate;

use crate::domain::entities::DocumentationType;

struct Phase {
    name: &'static str,
    quarter: &'static str,
    status: &'static str,
    items: &'static [&'static str],
}

const ROADMAP: &[Phase] = &[
    Phase {
        name: "Fundament",
        quarter: "Q1 2025",
        status: "abgeschlossen",
        items: &[
            "Objekt-, Einheiten- und Mieterverwaltung",
            "Vertragsverwaltung mit Mietanpassungen",
            "Dokumentenablage mit Vorlagen",
        ],
    },
    Phase {
        name: "Finanzen",
        quarter: "Q2 2025",
        status: "abgeschlossen",
        items: &[
            "Bankanbindung über finAPI und CSV-Import",
            "Regelbasierte Kategorisierung von Kontobewegungen",
            "Betriebskostenabrechnung",
        ],
    },
    Phase {
        name: "Steuern",
        quarter: "Q3 2025",
        status: "in Arbeit",
        items: &[
            "Anlage-V-Assistent in fünf Schritten",
            "ELSTER-Übermittlung mit Plausibilitätsprüfung",
            "AfA-Berechnung je Gebäude",
        ],
    },
    Phase {
        name: "Kommunikation & Automatisierung",
        quarter: "Q4 2025",
        status: "geplant",
        items: &[
            "Briefversand über LetterXpress",
            "WhatsApp-Kommunikation mit Mietern",
            "Versionierte Workflows mit kontrollierter Aktivierung",
            "KI-gestützte Dokumentenanalyse",
        ],
    },
];

struct TestArea {
    area: &'static str,
    kind: &'static str,
    focus: &'static str,
}

const TEST_AREAS: &[TestArea] = &[
    TestArea {
        area: "Kategorisierungsregeln",
        kind: "Unit",
        focus: "Erste passende Regel, Groß-/Kleinschreibung, inaktive Regeln",
    },
    TestArea {
        area: "Anlage-V-Assistent",
        kind: "Service",
        focus: "Schrittfolge, Nettoeinkünfte, Einordnung der Prüfergebnisse",
    },
    TestArea {
        area: "Workflow-Versionen",
        kind: "Service",
        focus: "Genau eine aktive Version, Archivierung bei Aktivierung",
    },
    TestArea {
        area: "Dokumentationsendpunkte",
        kind: "HTTP",
        focus: "401 ohne Anmeldung, Dateigröße gleich Markdown-Länge",
    },
    TestArea {
        area: "WhatsApp-Webhook",
        kind: "HTTP",
        focus: "Signaturprüfung, Handshake, doppelte Zustellung",
    },
];

struct Milestone {
    date: &'static str,
    title: &'static str,
    detail: &'static str,
}

const TIMELINE: &[Milestone] = &[
    Milestone {
        date: "2025-01-15",
        title: "Projektstart",
        detail: "Datenmodell für Objekte, Einheiten, Mieter und Verträge",
    },
    Milestone {
        date: "2025-03-31",
        title: "Beta Verwaltung",
        detail: "Erste Hausverwaltungen arbeiten produktiv",
    },
    Milestone {
        date: "2025-06-30",
        title: "Finanzmodul",
        detail: "Bankimport und automatische Kategorisierung",
    },
    Milestone {
        date: "2025-09-30",
        title: "Steuermodul",
        detail: "Anlage V und ELSTER-Übermittlung",
    },
    Milestone {
        date: "2025-12-15",
        title: "Kommunikation",
        detail: "Briefversand, WhatsApp und Workflow-Versionierung",
    },
];

/// Render the report of the given type
pub fn render(kind: DocumentationType, date: NaiveDate) -> String {
    match kind {
        DocumentationType::Roadmap => render_roadmap(date),
        DocumentationType::Testing => render_testing(date),
        DocumentationType::Timeline => render_timeline(date),
    }
}

fn render_header(buf: &mut String, kind: DocumentationType, date: NaiveDate) {
    buf.push_str(&format!("# {}\n\n", kind.title()));
    buf.push_str(&format!(
        "_Erstellt am {}_\n\n",
        date.format("%d.%m.%Y")
    ));
}

pub fn render_roadmap(date: NaiveDate) -> String {
    let mut buf = String::new();
    render_header(&mut buf, DocumentationType::Roadmap, date);

    buf.push_str("## Übersicht\n\n");
    buf.push_str("| Phase | Zeitraum | Status |\n");
    buf.push_str("|---|---|---|\n");
    for phase in ROADMAP {
        buf.push_str(&format!(
            "| {} | {} | {} |\n",
            phase.name, phase.quarter, phase.status
        ));
    }
    buf.push('\n');

    for phase in ROADMAP {
        buf.push_str(&format!("## {} ({})\n\n", phase.name, phase.quarter));
        for item in phase.items {
            buf.push_str(&format!("- {}\n", item));
        }
        buf.push('\n');
    }

    buf
}

pub fn render_testing(date: NaiveDate) -> String {
    let mut buf = String::new();
    render_header(&mut buf, DocumentationType::Testing, date);

    buf.push_str("## Testpyramide\n\n");
    buf.push_str("- **Unit-Tests** für reine Fachlogik ohne Netzwerk\n");
    buf.push_str("- **Service-Tests** mit In-Memory-Implementierungen der Plattform\n");
    buf.push_str("- **HTTP-Tests** gegen den vollständigen Router\n\n");

    buf.push_str("## Abdeckung nach Bereich\n\n");
    buf.push_str("| Bereich | Ebene | Schwerpunkt |\n");
    buf.push_str("|---|---|---|\n");
    for area in TEST_AREAS {
        buf.push_str(&format!(
            "| {} | {} | {} |\n",
            area.area, area.kind, area.focus
        ));
    }
    buf.push('\n');

    buf.push_str("## Qualitätssicherung\n\n");
    buf.push_str("1. Jede Änderung läuft durch die vollständige Testsuite.\n");
    buf.push_str("2. Beträge werden ausschließlich als Dezimalzahlen gerechnet.\n");
    buf.push_str("3. Fehler externer Dienste werden protokolliert und nicht wiederholt.\n");

    buf
}

pub fn render_timeline(date: NaiveDate) -> String {
    let mut buf = String::new();
    render_header(&mut buf, DocumentationType::Timeline, date);

    buf.push_str("## Meilensteine\n\n");
    for milestone in TIMELINE {
        let reached = NaiveDate::parse_from_str(milestone.date, "%Y-%m-%d")
            .map(|d| d <= date)
            .unwrap_or(false);
        let marker = if reached { "[x]" } else { "[ ]" };
        buf.push_str(&format!(
            "- {} **{}** ({}): {}\n",
            marker, milestone.title, milestone.date, milestone.detail
        ));
    }

    buf
}
