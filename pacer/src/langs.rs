//! Interface language packs: ca / es / en / fr.
//!
//! A pack supplies the strings the presentation layer renders, the default
//! two-phase cycle used when the phase list is empty, and the default alert
//! text for every event. Unknown codes fall back to Catalan, the app's
//! original language.

use crate::alerts::AlertEvent;
use crate::session::{Phase, DEFAULT_ACTIVE_MIN, DEFAULT_PREP_MIN};
use std::collections::BTreeMap;

pub const CODES: [&str; 4] = ["ca", "es", "en", "fr"];

pub struct UiStrings {
    pub app_title: &'static str,
    pub subtitle: &'static str,
    pub current_phase: &'static str,
    pub start: &'static str,
    pub pause: &'static str,
    pub reset: &'static str,
    pub add10: &'static str,
    pub skip: &'static str,
    pub switch_phase: &'static str,
    pub voice_alerts: &'static str,
    pub tts: &'static str,
    pub rec: &'static str,
    pub language: &'static str,
    pub phases: &'static str,
    pub add_phase: &'static str,
    pub remove: &'static str,
    pub move_up: &'static str,
    pub move_down: &'static str,
    pub name: &'static str,
    pub minutes: &'static str,
    pub color: &'static str,
    pub alerts_texts: &'static str,
    pub theme: &'static str,
    pub light: &'static str,
    pub dark: &'static str,
    pub import_cfg: &'static str,
    pub export_cfg: &'static str,
    pub share_cfg: &'static str,
    pub help: &'static str,
    pub tip: &'static str,
}

pub struct LangPack {
    pub code: &'static str,
    pub name: &'static str,
    pub ui: UiStrings,
    pub help_text: &'static str,
    /// Localized titles for the default Preparation / Active cycle.
    prep_title: &'static str,
    active_title: &'static str,
    alerts: [(AlertEvent, &'static str); 7],
}

impl LangPack {
    /// Default cycle installed whenever the phase list is empty.
    pub fn default_cycle(&self) -> Vec<Phase> {
        vec![
            Phase {
                id: "prep".into(),
                title: self.prep_title.into(),
                minutes: DEFAULT_PREP_MIN,
                color: "#f59e0b".into(),
            },
            Phase {
                id: "active".into(),
                title: self.active_title.into(),
                minutes: DEFAULT_ACTIVE_MIN,
                color: "#10b981".into(),
            },
        ]
    }

    /// Default alert text for every event in the closed set.
    pub fn default_alerts(&self) -> BTreeMap<String, String> {
        self.alerts
            .iter()
            .map(|(event, text)| (event.key().to_string(), (*text).to_string()))
            .collect()
    }
}

/// Pack for a language code, falling back to Catalan for unknown codes.
pub fn pack(code: &str) -> &'static LangPack {
    match code {
        "es" => &ES,
        "en" => &EN,
        "fr" => &FR,
        _ => &CA,
    }
}

static CA: LangPack = LangPack {
    code: "ca",
    name: "Català/Valencià",
    ui: UiStrings {
        app_title: "Ritme de sessió",
        subtitle: "Temporitzador cíclic amb avisos personalitzables",
        current_phase: "Fase actual",
        start: "Inicia",
        pause: "Pausa",
        reset: "Reinicia",
        add10: "+10 min a l'interval",
        skip: "Següent interval",
        switch_phase: "Canvia de fase",
        voice_alerts: "Avisos de veu",
        tts: "Síntesi de veu",
        rec: "Gravacions pròpies",
        language: "Idioma de la interfície",
        phases: "Cicles personalitzats (fases)",
        add_phase: "Afig fase",
        remove: "Lleva",
        move_up: "Puja",
        move_down: "Baixa",
        name: "Nom",
        minutes: "Minuts",
        color: "Color",
        alerts_texts: "Textos d'avisos (per a TTS)",
        theme: "Tema i paleta",
        light: "Clar",
        dark: "Fosc",
        import_cfg: "Importa configuració",
        export_cfg: "Exporta configuració",
        share_cfg: "Comparteix configuració",
        help: "Ajuda",
        tip: "Consell: Les gravacions substitueixen el TTS quan existisquen.",
    },
    help_text: "— Ús bàsic —\n\
        1) Configura les fases del cicle (nom, minuts i color).\n\
        2) Inicia/Pausa el temporitzador. Pots afegir +10' o saltar al següent interval.\n\
        3) Activa TTS o usa els teus avisos gravats.\n\
        4) Exporta la configuració per a usar-la en altres dispositius.\n\n\
        — Consells —\n\
        · Reordena fases per adaptar el cicle.\n\
        · Les gravacions es queden a l'instància fins que les exportes.\n\
        · Personalitza el tema (clar/fosc) i els colors primari/acent.",
    prep_title: "Preparació",
    active_title: "Actiu",
    alerts: [
        (AlertEvent::Start, "Temporitzador iniciat"),
        (AlertEvent::Pause, "Temporitzador en pausa"),
        (AlertEvent::Reset, "Temporitzador reiniciat"),
        (AlertEvent::AddTen, "Afegits deu minuts"),
        (AlertEvent::SkipToNext, "Salt al pròxim cicle"),
        (AlertEvent::PhaseChange, "Canvi de fase"),
        (AlertEvent::TimerEnd, "Interval completat"),
    ],
};

static ES: LangPack = LangPack {
    code: "es",
    name: "Castellano",
    ui: UiStrings {
        app_title: "Ritmo de sesión",
        subtitle: "Temporizador cíclico con avisos personalizables",
        current_phase: "Fase actual",
        start: "Iniciar",
        pause: "Pausa",
        reset: "Reiniciar",
        add10: "+10 min al intervalo",
        skip: "Siguiente intervalo",
        switch_phase: "Cambiar de fase",
        voice_alerts: "Avisos de voz",
        tts: "Síntesis de voz",
        rec: "Grabaciones propias",
        language: "Idioma de la interfaz",
        phases: "Ciclos personalizados (fases)",
        add_phase: "Añadir fase",
        remove: "Quitar",
        move_up: "Subir",
        move_down: "Bajar",
        name: "Nombre",
        minutes: "Minutos",
        color: "Color",
        alerts_texts: "Textos de avisos (para TTS)",
        theme: "Tema y paleta",
        light: "Claro",
        dark: "Oscuro",
        import_cfg: "Importar configuración",
        export_cfg: "Exportar configuración",
        share_cfg: "Compartir configuración",
        help: "Ayuda",
        tip: "Consejo: Las grabaciones sustituyen al TTS cuando existan.",
    },
    help_text: "— Uso básico —\n\
        1) Configura las fases (nombre, minutos, color).\n\
        2) Inicia/Pausa. Añade +10' o salta al siguiente intervalo.\n\
        3) Activa TTS o usa tus avisos grabados.\n\
        4) Exporta la configuración para reutilizarla.\n\n\
        — Consejos —\n\
        · Reordena fases según tus necesidades.\n\
        · Las grabaciones permanecen en la instancia hasta exportarlas.\n\
        · Personaliza tema (claro/oscuro) y colores primario/acento.",
    prep_title: "Preparación",
    active_title: "Activo",
    alerts: [
        (AlertEvent::Start, "Temporizador iniciado"),
        (AlertEvent::Pause, "Temporizador en pausa"),
        (AlertEvent::Reset, "Temporizador reiniciado"),
        (AlertEvent::AddTen, "Añadidos diez minutos"),
        (AlertEvent::SkipToNext, "Salto al próximo ciclo"),
        (AlertEvent::PhaseChange, "Cambio de fase"),
        (AlertEvent::TimerEnd, "Intervalo completado"),
    ],
};

static EN: LangPack = LangPack {
    code: "en",
    name: "English",
    ui: UiStrings {
        app_title: "Session pacing",
        subtitle: "Cyclic timer with customizable alerts",
        current_phase: "Current phase",
        start: "Start",
        pause: "Pause",
        reset: "Reset",
        add10: "+10 min to interval",
        skip: "Next interval",
        switch_phase: "Switch phase",
        voice_alerts: "Voice alerts",
        tts: "Text-to-speech",
        rec: "Custom recordings",
        language: "App language",
        phases: "Custom cycles (phases)",
        add_phase: "Add phase",
        remove: "Remove",
        move_up: "Move up",
        move_down: "Move down",
        name: "Name",
        minutes: "Minutes",
        color: "Color",
        alerts_texts: "Alert texts (for TTS)",
        theme: "Theme & palette",
        light: "Light",
        dark: "Dark",
        import_cfg: "Import config",
        export_cfg: "Export config",
        share_cfg: "Share config",
        help: "Help",
        tip: "Tip: Recordings override TTS when available.",
    },
    help_text: "— Basics —\n\
        1) Configure phases (name, minutes, color).\n\
        2) Start/Pause the timer. Add +10' or jump to the next interval.\n\
        3) Enable TTS or use your recorded alerts.\n\
        4) Export your configuration to reuse elsewhere.\n\n\
        — Tips —\n\
        · Reorder phases to fit your flow.\n\
        · Recordings stay in the instance until exported.\n\
        · Customize theme (light/dark) and primary/accent colors.",
    prep_title: "Preparation",
    active_title: "Active",
    alerts: [
        (AlertEvent::Start, "Timer started"),
        (AlertEvent::Pause, "Timer paused"),
        (AlertEvent::Reset, "Timer reset"),
        (AlertEvent::AddTen, "Ten minutes added"),
        (AlertEvent::SkipToNext, "Jump to next cycle"),
        (AlertEvent::PhaseChange, "Phase changed"),
        (AlertEvent::TimerEnd, "Interval completed"),
    ],
};

static FR: LangPack = LangPack {
    code: "fr",
    name: "Français",
    ui: UiStrings {
        app_title: "Rythme de session",
        subtitle: "Minuteur cyclique avec alertes personnalisables",
        current_phase: "Phase actuelle",
        start: "Démarrer",
        pause: "Pause",
        reset: "Réinitialiser",
        add10: "+10 min à l'intervalle",
        skip: "Prochain intervalle",
        switch_phase: "Changer de phase",
        voice_alerts: "Alertes vocales",
        tts: "Synthèse vocale",
        rec: "Enregistrements perso",
        language: "Langue de l'application",
        phases: "Cycles personnalisés (phases)",
        add_phase: "Ajouter une phase",
        remove: "Supprimer",
        move_up: "Monter",
        move_down: "Descendre",
        name: "Nom",
        minutes: "Minutes",
        color: "Couleur",
        alerts_texts: "Textes d'alertes (pour TTS)",
        theme: "Thème et palette",
        light: "Clair",
        dark: "Sombre",
        import_cfg: "Importer la config",
        export_cfg: "Exporter la config",
        share_cfg: "Partager la config",
        help: "Aide",
        tip: "Astuce : Les enregistrements remplacent le TTS s'ils existent.",
    },
    help_text: "— Utilisation —\n\
        1) Configurez les phases (nom, minutes, couleur).\n\
        2) Lancez/Mettez en pause. Ajoutez +10' ou passez à l'intervalle suivant.\n\
        3) Activez la synthèse vocale ou utilisez vos alertes enregistrées.\n\
        4) Exportez la configuration pour l'utiliser ailleurs.\n\n\
        — Conseils —\n\
        · Réordonnez les phases selon vos besoins.\n\
        · Les enregistrements restent dans l'instance jusqu'à exportation.\n\
        · Personnalisez le thème (clair/sombre) et les couleurs primaire/accent.",
    prep_title: "Préparation",
    active_title: "Actif",
    alerts: [
        (AlertEvent::Start, "Minuteur démarré"),
        (AlertEvent::Pause, "Minuteur en pause"),
        (AlertEvent::Reset, "Minuteur réinitialisé"),
        (AlertEvent::AddTen, "Dix minutes ajoutées"),
        (AlertEvent::SkipToNext, "Passage au prochain cycle"),
        (AlertEvent::PhaseChange, "Changement de phase"),
        (AlertEvent::TimerEnd, "Intervalle terminé"),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pack_covers_every_event() {
        for code in CODES {
            let alerts = pack(code).default_alerts();
            for event in AlertEvent::ALL {
                assert!(
                    alerts.get(event.key()).is_some_and(|t| !t.is_empty()),
                    "{code} missing text for {}",
                    event.key()
                );
            }
        }
    }

    #[test]
    fn unknown_code_falls_back_to_catalan() {
        assert_eq!(pack("de").code, "ca");
        assert_eq!(pack("en").code, "en");
    }

    #[test]
    fn default_cycle_is_prep_then_active() {
        let cycle = pack("en").default_cycle();
        assert_eq!(cycle.len(), 2);
        assert_eq!(cycle[0].id, "prep");
        assert_eq!(cycle[0].minutes, DEFAULT_PREP_MIN);
        assert_eq!(cycle[1].id, "active");
        assert_eq!(cycle[1].minutes, DEFAULT_ACTIVE_MIN);
    }
}
