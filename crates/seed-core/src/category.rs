//! Closed categorical enumerations used by generated rows and reports.

use std::fmt;

/// A field whose values come from a fixed, closed list.
pub trait Category: Copy + fmt::Debug + 'static {
    /// Every value of the category, in declaration order.
    const ALL: &'static [Self];

    /// Stored representation.
    fn as_str(self) -> &'static str;
}

macro_rules! category {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Category for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

category!(
    /// `Zona.categoria`
    ZoneCategory {
        Centrica => "Zona Céntrica",
        Residencial => "Barrio Residencial",
        Industrial => "Área Industrial",
        Conflicto => "Zona de Conflicto",
    }
);

category!(
    /// `Reporte.tipoIncidencia`
    IncidentType {
        RoboConViolencia => "Robo con violencia",
        ConflictoVecinal => "Conflicto vecinal",
        Vandalismo => "Vandalismo",
        SospechaDeActividad => "Sospecha de actividad",
    }
);

category!(
    /// `Reporte.estado`
    ReportStatus {
        Nuevo => "Nuevo",
        EnAnalisis => "En análisis",
        Escalado => "Escalado a policía",
        Cerrado => "Cerrado",
        Resuelto => "Resuelto",
    }
);

category!(
    /// `Reporte.prioridad`
    Priority {
        Critica => "Crítica",
        Alta => "Alta",
        Media => "Media",
        Baja => "Baja",
    }
);

category!(
    /// `Reporte.medioReporte`
    ReportMedium {
        AppCiudadana => "App Ciudadana",
        WebOficial => "Web Oficial",
        RedSocial => "Red Social",
    }
);

category!(
    /// `Sensor.tipo`
    SensorType {
        RuidoAmbiental => "Ruido Ambiental",
        FlujoPeatonal => "Flujo Peatonal",
        CalidadAire => "Calidad Aire",
        CamaraCctv => "Cámara CCTV",
    }
);

category!(
    /// `RegistroSensor.unidad`
    ReadingUnit {
        Decibel => "dB",
        Ppm => "PPM",
    }
);

category!(
    /// `Multimedia.tipoArchivo`
    FileType {
        Jpeg => "imagen/jpeg",
        Mp4 => "video/mp4",
    }
);

category!(
    /// `Alerta.tipo`
    AlertType {
        UmbralDeRuido => "Umbral de Ruido Superado",
        ConcurrenciaAnormal => "Patrón de Concurrencia Anormal",
        Vandalismo => "Alerta de Vandalismo",
    }
);

category!(
    /// `Indicador.nombre`
    IndicatorName {
        PercepcionDeRiesgo => "Nivel de Percepción de Riesgo",
        IndiceDeConflictos => "Índice de Conflictos",
        FrecuenciaDeIncidentes => "Frecuencia de Incidentes",
    }
);

category!(
    /// `Informe.tipo`
    InformeType {
        AnalisisDeRiesgo => "Análisis de Riesgo",
        Recomendaciones => "Recomendaciones Operativas",
        ResumenMensual => "Resumen Mensual de Seguridad",
    }
);

impl Priority {
    /// Priorities counted as critical incidents by the risk report.
    pub const CRITICAL: [Priority; 2] = [Priority::Critica, Priority::Alta];
}

impl ReportStatus {
    /// Statuses counted as resolved by the efficiency report.
    pub const RESOLVED: [ReportStatus; 2] = [ReportStatus::Cerrado, ReportStatus::Resuelto];
}

/// Installed sensor status. Every generated sensor is active.
pub const SENSOR_ACTIVE: &str = "Activo";

/// Sources cited by every generated informe.
pub const INFORME_SOURCES: &str = "Sensores, Reportes, Datos Públicos";
