//! Geodistância
//!
//! Distância haversine usada pelo matcher para filtrar prestadores
//! dentro do raio de busca. O cálculo de rotas e ETA fica a cargo do
//! serviço de mapas externo.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distância em quilômetros entre dois pontos (lat, lng) em graus
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        assert_eq!(haversine_km(-23.5505, -46.6333, -23.5505, -46.6333), 0.0);
    }

    #[test]
    fn test_haversine_sao_paulo_to_campinas() {
        // São Paulo (Sé) -> Campinas (centro), ~88 km em linha reta
        let d = haversine_km(-23.5505, -46.6333, -22.9056, -47.0608);
        assert!(d > 80.0 && d < 95.0, "distância fora do esperado: {}", d);
    }

    #[test]
    fn test_haversine_short_distance() {
        // ~1.1 km dentro da mesma cidade
        let d = haversine_km(-23.5505, -46.6333, -23.5605, -46.6333);
        assert!(d > 1.0 && d < 1.3, "distância fora do esperado: {}", d);
    }
}
