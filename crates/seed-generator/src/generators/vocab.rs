//! Word lists for es_ES-flavoured synthetic values.

pub const GIVEN_NAMES: &[&str] = &[
    "Lucía", "Hugo", "Martina", "Mateo", "Sofía", "Martín", "María", "Lucas", "Julia", "Leo",
    "Paula", "Daniel", "Valeria", "Alejandro", "Emma", "Pablo", "Daniela", "Manuel", "Carla",
    "Álvaro", "Alba", "Adrián", "Noa", "Mario", "Sara", "Diego", "Carmen", "Javier", "Elena",
    "Marcos", "Inés", "Sergio", "Claudia", "Jorge", "Irene", "Raúl",
];

pub const SURNAMES: &[&str] = &[
    "García", "Rodríguez", "González", "Fernández", "López", "Martínez", "Sánchez", "Pérez",
    "Gómez", "Martín", "Jiménez", "Ruiz", "Hernández", "Díaz", "Moreno", "Muñoz", "Álvarez",
    "Romero", "Alonso", "Gutiérrez", "Navarro", "Torres", "Domínguez", "Vázquez", "Ramos",
    "Gil", "Ramírez", "Serrano", "Blanco", "Molina", "Morales", "Suárez", "Ortega", "Delgado",
];

pub const CITIES: &[&str] = &[
    "Madrid", "Barcelona", "Valencia", "Sevilla", "Zaragoza", "Málaga", "Murcia", "Palma",
    "Bilbao", "Alicante", "Córdoba", "Valladolid", "Vigo", "Gijón", "Granada", "Vitoria",
    "A Coruña", "Elche", "Oviedo", "Badalona", "Cartagena", "Jerez", "Sabadell", "Móstoles",
    "Pamplona", "Almería", "Santander", "Burgos", "Albacete", "Logroño", "Salamanca", "Huelva",
    "Cáceres", "Toledo", "Lugo", "Girona",
];

pub const PROVINCES: &[&str] = &[
    "Madrid", "Barcelona", "Valencia", "Sevilla", "Zaragoza", "Málaga", "Murcia", "Baleares",
    "Vizcaya", "Alicante", "Córdoba", "Valladolid", "Pontevedra", "Asturias", "Granada",
    "Álava", "Navarra", "Cantabria", "Burgos", "Toledo",
];

pub const STREET_TYPES: &[&str] = &[
    "Calle", "Avenida", "Paseo", "Plaza", "Camino", "Ronda", "Vía", "Glorieta", "Pasaje",
];

pub const STREET_NAMES: &[&str] = &[
    "Mayor", "del Sol", "de la Paz", "Real", "Nueva", "del Carmen", "de Alcalá", "San Juan",
    "de Goya", "de Cervantes", "del Mar", "de los Olivos", "de la Constitución", "del Pilar",
    "de Colón", "Santa Ana", "de la Estación", "del Río", "de las Flores", "Gran Vía",
];

pub const EMAIL_DOMAINS: &[&str] = &[
    "gmail.com", "hotmail.com", "yahoo.es", "outlook.es", "correo.es", "example.org",
];

pub const WORDS: &[&str] = &[
    "vecino", "calle", "noche", "ruido", "zona", "parque", "esquina", "coche", "puerta",
    "ventana", "grupo", "persona", "barrio", "tienda", "plaza", "semana", "hora", "policía",
    "alarma", "luz", "farola", "portal", "acera", "moto", "bicicleta", "contenedor", "basura",
    "pintada", "muro", "escalera", "edificio", "local", "bar", "mercado", "estación", "parada",
    "autobús", "tráfico", "cruce", "semáforo", "jardín", "fuente", "banco", "cámara", "sensor",
    "aviso", "patrulla", "seguridad", "incidente", "denuncia", "testigo", "daño", "robo",
    "pelea", "grito", "humo", "olor", "agua", "rotura", "señal", "cerca", "después", "antes",
    "durante", "varios", "otra", "nuevo", "grave", "leve", "rápido", "lento", "frecuente",
    "habitual", "extraño", "visto", "oído", "reportado", "revisado", "pendiente",
];
